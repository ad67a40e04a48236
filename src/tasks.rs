//! Background fetch tasks
//!
//! Network requests issued by the app run on tokio tasks and report back to
//! the main loop over a channel, so the terminal keeps redrawing while a page
//! or a forecast is in flight.

use tokio::sync::mpsc;
use tracing::debug;

use crate::data::{OpenWeatherClient, PlacesClient};
use crate::detail::{WeatherRequest, WeatherResponse};
use crate::store::{PageRequest, PageResponse};

/// Channel capacity; the app never has more than a couple of requests in flight
const CHANNEL_CAPACITY: usize = 32;

/// Messages sent from background tasks to the main app
#[derive(Debug)]
pub enum TaskMessage {
    /// A page of cities finished loading (or failed)
    CitiesLoaded(PageResponse),
    /// Current weather and forecast finished loading (or failed)
    WeatherLoaded(WeatherResponse),
}

/// Spawns fetches against the live clients and collects their results
pub struct TaskRunner {
    places: PlacesClient,
    weather: OpenWeatherClient,
    sender: mpsc::Sender<TaskMessage>,
    receiver: mpsc::Receiver<TaskMessage>,
}

impl TaskRunner {
    pub fn new(places: PlacesClient, weather: OpenWeatherClient) -> Self {
        let (sender, receiver) = mpsc::channel(CHANNEL_CAPACITY);
        Self {
            places,
            weather,
            sender,
            receiver,
        }
    }

    /// Fetches a page of cities in the background
    pub fn spawn_page(&self, request: PageRequest) {
        debug!(epoch = request.epoch, offset = request.offset, "Spawning page fetch");
        let client = self.places.clone();
        let tx = self.sender.clone();
        tokio::spawn(async move {
            let response = request.execute(&client).await;
            let _ = tx.send(TaskMessage::CitiesLoaded(response)).await;
        });
    }

    /// Fetches current weather and forecast in the background
    pub fn spawn_weather(&self, request: WeatherRequest) {
        debug!(epoch = request.epoch, city = %request.city_name, "Spawning weather fetch");
        let client = self.weather.clone();
        let tx = self.sender.clone();
        tokio::spawn(async move {
            let response = request.execute(&client).await;
            let _ = tx.send(TaskMessage::WeatherLoaded(response)).await;
        });
    }

    /// Returns a finished result without blocking, if one is waiting
    pub fn try_recv(&mut self) -> Option<TaskMessage> {
        self.receiver.try_recv().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiKey;
    use crate::data::FetchError;
    use std::time::Duration;

    /// Nothing listens on the discard port, so every request is refused quickly
    const UNREACHABLE: &str = "http://127.0.0.1:9";

    fn runner() -> TaskRunner {
        let key = ApiKey::new("test-key").expect("Failed to build key");
        TaskRunner::new(
            PlacesClient::with_base_url(format!("{UNREACHABLE}/records")),
            OpenWeatherClient::with_base_url(key, UNREACHABLE),
        )
    }

    #[tokio::test]
    async fn test_try_recv_empty() {
        let mut runner = runner();
        assert!(runner.try_recv().is_none());
    }

    #[tokio::test]
    async fn test_page_failure_is_reported_with_epoch() {
        let mut runner = runner();
        runner.spawn_page(PageRequest {
            epoch: 7,
            text: String::new(),
            limit: 20,
            offset: 0,
        });

        let message = tokio::time::timeout(Duration::from_secs(10), runner.receiver.recv())
            .await
            .expect("Timed out waiting for page result")
            .expect("Channel closed");

        match message {
            TaskMessage::CitiesLoaded(response) => {
                assert_eq!(response.epoch, 7);
                assert!(matches!(response.result, Err(FetchError::RequestFailed(_))));
            }
            other => panic!("Expected CitiesLoaded, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_weather_failure_is_reported_with_epoch() {
        let mut runner = runner();
        runner.spawn_weather(WeatherRequest {
            epoch: 3,
            city_name: "Paris".to_string(),
        });

        let message = tokio::time::timeout(Duration::from_secs(10), runner.receiver.recv())
            .await
            .expect("Timed out waiting for weather result")
            .expect("Channel closed");

        match message {
            TaskMessage::WeatherLoaded(response) => {
                assert_eq!(response.epoch, 3);
                assert!(response.result.is_err());
            }
            other => panic!("Expected WeatherLoaded, got {:?}", other),
        }
    }
}
