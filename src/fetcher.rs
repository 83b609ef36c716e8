use log::{debug, error, trace};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::client::SensorSource;
use crate::scheduler::{FetchRequest, FetchResponse};

/// Serves fetch requests one at a time. Failed fetches produce no response.
pub fn spawn<S: SensorSource>(
    source: Arc<S>,
    mut requests: mpsc::Receiver<FetchRequest>,
    responses: mpsc::Sender<FetchResponse>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(request) = requests.recv().await {
            trace!("Fetch request for identity {}", request.identity.raw());
            match source.fetch_readings(&request.target).await {
                Ok(readings) => {
                    debug!("Fetched {} readings", readings.len());
                    let response = FetchResponse {
                        identity: request.identity,
                        readings,
                    };
                    if responses.send(response).await.is_err() {
                        debug!("Response channel closed, stopping fetcher");
                        break;
                    }
                }
                Err(e) => error!("Failed to fetch sensor data: {}", e),
            }
        }
    })
}
