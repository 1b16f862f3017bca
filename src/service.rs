use async_trait::async_trait;
use log::{debug, warn};
use reqwest::Client;
use serde_json::Value;

use crate::config::ServiceConfig;
use crate::error::RecipeError;
use crate::model::{RecipeDetail, RecipeSummary};

/// Read-only access to the remote recipe catalog
#[async_trait]
pub trait RecipeService: Send + Sync {
    /// Get the service name used in logs
    fn service_name(&self) -> &str;

    /// Recipes whose name starts with `letter`, in service order.
    /// An empty answer is `RecipeError::EmptyResult`.
    async fn search_by_first_letter(&self, letter: &str)
        -> Result<Vec<RecipeSummary>, RecipeError>;

    /// One recipe picked at random by the service
    async fn random_recipe(&self) -> Result<RecipeDetail, RecipeError>;
}

/// Client for the TheMealDB JSON API
pub struct MealDbClient {
    client: Client,
    base_url: String,
}

impl MealDbClient {
    /// Create a client from configuration
    pub fn new(config: &ServiceConfig) -> Result<Self, RecipeError> {
        let client = Client::builder()
            .timeout(config.timeout_duration())
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(MealDbClient {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Create a client with default settings against another base URL
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, RecipeError> {
        let config = ServiceConfig {
            base_url: base_url.into(),
            ..Default::default()
        };
        Self::new(&config)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET `path` and return the elements of its `meals` array
    async fn fetch_meals(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Vec<Value>, RecipeError> {
        let url = format!("{}/{}", self.base_url, path);
        debug!("GET {} {:?}", url, query);

        let mut request = self.client.get(&url);
        if !query.is_empty() {
            request = request.query(query);
        }
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(RecipeError::Status(status));
        }

        let body = response.text().await?;
        let mut payload: Value = serde_json::from_str(&body)?;

        match payload.get_mut("meals").map(Value::take) {
            Some(Value::Array(meals)) if !meals.is_empty() => Ok(meals),
            Some(Value::Array(_)) | Some(Value::Null) | None => Err(RecipeError::EmptyResult),
            Some(other) => {
                warn!("Unexpected 'meals' field in {} response: {}", path, other);
                Err(RecipeError::EmptyResult)
            }
        }
    }
}

#[async_trait]
impl RecipeService for MealDbClient {
    fn service_name(&self) -> &str {
        "themealdb"
    }

    async fn search_by_first_letter(
        &self,
        letter: &str,
    ) -> Result<Vec<RecipeSummary>, RecipeError> {
        let meals = self.fetch_meals("search.php", &[("f", letter)]).await?;

        let recipes: Vec<RecipeSummary> = meals
            .into_iter()
            .filter_map(|meal| match serde_json::from_value(meal) {
                Ok(recipe) => Some(recipe),
                Err(e) => {
                    warn!("Skipping undecodable recipe entry: {}", e);
                    None
                }
            })
            .collect();

        if recipes.is_empty() {
            return Err(RecipeError::EmptyResult);
        }
        debug!("Received {} recipes for letter '{}'", recipes.len(), letter);
        Ok(recipes)
    }

    async fn random_recipe(&self) -> Result<RecipeDetail, RecipeError> {
        let meals = self.fetch_meals("random.php", &[]).await?;
        let first = meals.into_iter().next().ok_or(RecipeError::EmptyResult)?;

        serde_json::from_value(first).map_err(|e| {
            warn!("Random recipe entry could not be decoded: {}", e);
            RecipeError::EmptyResult
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    #[tokio::test]
    async fn test_search_by_first_letter() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/search.php")
            .match_query(Matcher::UrlEncoded("f".into(), "a".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"meals": [
                    {"idMeal": "1", "strMeal": "Apam balik", "strCategory": "Dessert", "strArea": "Malaysian"},
                    {"idMeal": "2", "strMeal": "Ayam Percik", "strCategory": "Chicken", "strArea": null}
                ]}"#,
            )
            .create_async()
            .await;

        let client = MealDbClient::with_base_url(server.url()).unwrap();
        let recipes = client.search_by_first_letter("a").await.unwrap();

        assert_eq!(recipes.len(), 2);
        assert_eq!(recipes[0].name, "Apam balik");
        assert_eq!(recipes[1].id, "2");
        assert_eq!(recipes[1].area, None);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_null_meals_is_empty_result() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/search.php")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"meals": null}"#)
            .create_async()
            .await;

        let client = MealDbClient::with_base_url(server.url()).unwrap();
        let result = client.search_by_first_letter("q").await;
        assert!(matches!(result, Err(RecipeError::EmptyResult)));
    }

    #[tokio::test]
    async fn test_meals_not_an_array_is_empty_result() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/search.php")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"meals": "nope"}"#)
            .create_async()
            .await;

        let client = MealDbClient::with_base_url(server.url()).unwrap();
        let result = client.search_by_first_letter("a").await;
        assert!(matches!(result, Err(RecipeError::EmptyResult)));
    }

    #[tokio::test]
    async fn test_undecodable_entries_are_skipped() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/search.php")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"meals": [null, 42, {"idMeal": "7", "strMeal": "Arrabiata"}]}"#)
            .create_async()
            .await;

        let client = MealDbClient::with_base_url(server.url()).unwrap();
        let recipes = client.search_by_first_letter("a").await.unwrap();
        assert_eq!(recipes.len(), 1);
        assert_eq!(recipes[0].id, "7");
    }

    #[tokio::test]
    async fn test_random_recipe_takes_first_entry() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/random.php")
            .with_status(200)
            .with_body(
                r#"{"meals": [{
                    "idMeal": "52874",
                    "strMeal": "Beef and Mustard Pie",
                    "strInstructions": "Preheat the oven.",
                    "strYoutube": "https://www.youtube.com/watch?v=nMyBC9staMU",
                    "strIngredient1": "Beef",
                    "strMeasure1": "1kg"
                }]}"#,
            )
            .create_async()
            .await;

        let client = MealDbClient::with_base_url(format!("{}/", server.url())).unwrap();
        let recipe = client.random_recipe().await.unwrap();

        assert_eq!(recipe.id, "52874");
        assert_eq!(
            recipe.video_url.as_deref(),
            Some("https://www.youtube.com/watch?v=nMyBC9staMU")
        );
        assert_eq!(recipe.slot(1).unwrap().measure.as_deref(), Some("1kg"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_random_recipe_empty_array() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/random.php")
            .with_status(200)
            .with_body(r#"{"meals": []}"#)
            .create_async()
            .await;

        let client = MealDbClient::with_base_url(server.url()).unwrap();
        assert!(matches!(
            client.random_recipe().await,
            Err(RecipeError::EmptyResult)
        ));
    }

    #[tokio::test]
    async fn test_non_success_status() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/random.php")
            .with_status(503)
            .with_body("unavailable")
            .create_async()
            .await;

        let client = MealDbClient::with_base_url(server.url()).unwrap();
        let err = client.random_recipe().await.unwrap_err();
        assert!(matches!(err, RecipeError::Status(s) if s.as_u16() == 503));
    }

    #[tokio::test]
    async fn test_malformed_json() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/random.php")
            .with_status(200)
            .with_body("<html>maintenance</html>")
            .create_async()
            .await;

        let client = MealDbClient::with_base_url(server.url()).unwrap();
        let err = client.random_recipe().await.unwrap_err();
        assert!(matches!(err, RecipeError::MalformedBody(_)));
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let client = MealDbClient::with_base_url("http://localhost:1234/api/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:1234/api");
        assert_eq!(client.service_name(), "themealdb");
    }
}
