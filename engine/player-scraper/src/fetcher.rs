use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{Result, ScrapeError};
use crate::scraper::parse_per_game_table;
use crate::types::ScrapedTable;

/// Connection and parsing settings for the season scraper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperSettings {
    /// Site root, without a trailing slash
    pub base_url: String,
    /// `id` attribute of the per-game statistics table
    pub table_id: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// User agent sent with every request
    pub user_agent: String,
}

impl Default for ScraperSettings {
    fn default() -> Self {
        Self {
            base_url: "https://www.basketball-reference.com".to_string(),
            table_id: "per_game_stats".to_string(),
            timeout_secs: 30,
            user_agent: "Mozilla/5.0 (X11; Linux x86_64) nba-ratings/0.1".to_string(),
        }
    }
}

/// basketball-reference per-game statistics scraper
pub struct SeasonStatsScraper {
    client: Client,
    settings: ScraperSettings,
}

impl SeasonStatsScraper {
    /// Create a new scraper
    pub fn new(settings: ScraperSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .user_agent(settings.user_agent.clone())
            .build()
            .map_err(|source| ScrapeError::Network { url: settings.base_url.clone(), source })?;

        Ok(Self { client, settings })
    }

    /// URL of the per-game statistics page for a season
    pub fn season_url(&self, season: u16) -> String {
        format!(
            "{}/leagues/NBA_{season}_per_game.html",
            self.settings.base_url.trim_end_matches('/')
        )
    }

    /// Fetch the raw document for a season
    pub async fn fetch_season(&self, season: u16) -> Result<String> {
        let url = self.season_url(season);
        info!("Fetching season {} from: {}", season, url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| ScrapeError::Network { url: url.clone(), source })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::Status { url, status });
        }

        let html = response
            .text()
            .await
            .map_err(|source| ScrapeError::Network { url: url.clone(), source })?;
        debug!("Fetched {} bytes for season {}", html.len(), season);

        Ok(html)
    }

    /// Fetch and parse a season's statistics table
    pub async fn scrape_season(&self, season: u16) -> Result<ScrapedTable> {
        let html = self.fetch_season(season).await?;
        let url = self.season_url(season);
        let table = parse_per_game_table(&html, &self.settings.table_id, season, &url)?;

        info!(
            "Parsed season {}: {} columns, {} player rows",
            season,
            table.headers.len(),
            table.len()
        );

        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_season_url() {
        let scraper = SeasonStatsScraper::new(ScraperSettings::default()).unwrap();
        assert_eq!(
            scraper.season_url(2024),
            "https://www.basketball-reference.com/leagues/NBA_2024_per_game.html"
        );
    }

    #[test]
    fn test_season_url_ignores_trailing_slash() {
        let settings = ScraperSettings {
            base_url: "http://127.0.0.1:8080/".to_string(),
            ..ScraperSettings::default()
        };
        let scraper = SeasonStatsScraper::new(settings).unwrap();
        assert_eq!(scraper.season_url(1999), "http://127.0.0.1:8080/leagues/NBA_1999_per_game.html");
    }
}
