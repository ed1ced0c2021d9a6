use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::api::client::ApiClient;
use crate::error::Result;
use crate::models::Team;

#[derive(Deserialize)]
struct TeamListResponse {
    team_list: Vec<String>,
}

/// The teams router reads its arguments from a nested `body` object.
#[derive(Serialize)]
struct Envelope<T> {
    body: T,
}

#[derive(Serialize)]
struct CreateTeamBody<'a> {
    team_name: &'a str,
    members: &'a [String],
}

#[derive(Serialize)]
struct TeamNameBody<'a> {
    team_name: &'a str,
}

impl ApiClient {
    #[instrument(skip(self), level = "debug")]
    pub async fn list_teams(&self) -> Result<Vec<String>> {
        let response: TeamListResponse = self.get_json("/teams/my-teams").await?;
        Ok(response.team_list)
    }

    #[instrument(skip(self), level = "debug")]
    pub async fn team_info(&self, team_name: &str) -> Result<Team> {
        let request = self
            .client
            .get(self.url("/teams/"))
            .query(&[("team_name", team_name)]);
        let response = self.send(request).await?;
        Self::decode(response).await
    }

    #[instrument(skip(self), level = "debug")]
    pub async fn create_team(&self, team_name: &str, members: &[String]) -> Result<()> {
        let request = self.client.post(self.url("/teams/")).json(&Envelope {
            body: CreateTeamBody { team_name, members },
        });
        self.send_expect_ok(request).await?;
        tracing::info!("Created team {} with {} members", team_name, members.len());
        Ok(())
    }

    #[instrument(skip(self), level = "debug")]
    pub async fn trigger_team_analysis(&self, team_name: &str) -> Result<()> {
        let request = self.client.post(self.url("/teams/trigger")).json(&Envelope {
            body: TeamNameBody { team_name },
        });
        self.send(request).await?;
        Ok(())
    }

    #[instrument(skip(self), level = "debug")]
    pub async fn delete_team(&self, team_name: &str) -> Result<()> {
        let request = self
            .client
            .delete(self.url("/teams/"))
            .query(&[("team_name", team_name)]);
        self.send_expect_ok(request).await?;
        tracing::info!("Deleted team {}", team_name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::api::client::ApiClient;
    use crate::error::Error;

    #[tokio::test]
    async fn test_list_and_fetch_team() -> anyhow::Result<()> {
        let mock_server = MockServer::start().await;
        let client = ApiClient::new(&mock_server.uri(), None)?;

        Mock::given(method("GET"))
            .and(path("/teams/my-teams"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"team_list": ["Bit-Buddies"]})),
            )
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/teams/"))
            .and(query_param("team_name", "Bit-Buddies"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "team_name": "Bit-Buddies",
                "team_members": ["Vss4969", "chiru4969"],
                "status": "Not Started",
                "metrics": {"project_descriptions": null}
            })))
            .mount(&mock_server)
            .await;

        let teams = client.list_teams().await?;
        assert_eq!(teams, vec!["Bit-Buddies".to_string()]);

        let team = client.team_info("Bit-Buddies").await?;
        assert_eq!(team.team_members.len(), 2);
        assert!(!team.metrics.is_present());
        Ok(())
    }

    #[tokio::test]
    async fn test_create_team_wraps_body() -> anyhow::Result<()> {
        let mock_server = MockServer::start().await;
        let client = ApiClient::new(&mock_server.uri(), None)?;

        Mock::given(method("POST"))
            .and(path("/teams/"))
            .and(body_json(json!({
                "body": {"team_name": "Bit-Buddies", "members": ["alice", "bob"]}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "message": "Team added successfully"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        client
            .create_team("Bit-Buddies", &["alice".to_string(), "bob".to_string()])
            .await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_create_team_rejects_other_success_codes() -> anyhow::Result<()> {
        let mock_server = MockServer::start().await;
        let client = ApiClient::new(&mock_server.uri(), None)?;

        Mock::given(method("POST"))
            .and(path("/teams/"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "message": "Team added successfully"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let err = client
            .create_team("Bit-Buddies", &["alice".to_string()])
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(reqwest::StatusCode::CREATED));
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_team_requires_ok() -> anyhow::Result<()> {
        let mock_server = MockServer::start().await;
        let client = ApiClient::new(&mock_server.uri(), None)?;

        Mock::given(method("DELETE"))
            .and(path("/teams/"))
            .and(query_param("team_name", "gone"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&mock_server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/teams/"))
            .and(query_param("team_name", "Bit-Buddies"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&mock_server)
            .await;

        client.delete_team("Bit-Buddies").await?;
        let err = client.delete_team("gone").await.unwrap_err();
        assert!(matches!(err, Error::Http { .. }));
        Ok(())
    }
}
