use anyhow::{Context, Result};
use log::{debug, error, info, trace};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::client::SensorSource;
use crate::config::AppConfig;
use crate::dashboard::Presenter;
use crate::fetcher;
use crate::models::ApiTarget;
use crate::renderer::{self, RenderContext};
use crate::scheduler::{FetchRequest, FetchResponse, RequestIdentity, ResponseOutcome, Scheduler};
use crate::translations::Translations;

const CHANNEL_CAPACITY: usize = 4;

/// Drives one widget instance until `shutdown` resolves.
///
/// Presents the initial render, activates the scheduler, then loops over fetch
/// responses and timer expiries. Only responses carrying this instance's identity
/// change what is shown.
pub async fn run<S, P, F>(config: &AppConfig, source: S, presenter: &mut P, shutdown: F) -> Result<()>
where
    S: SensorSource,
    P: Presenter,
    F: Future<Output = ()>,
{
    let locale = config.dashboard.locale();
    let translations = Translations::for_locale(locale)?;
    let ctx = RenderContext {
        widget: &config.widget,
        translations: &translations,
        locale,
    };

    let target = ApiTarget {
        api_url: config.widget.api_url.clone(),
        token: config.widget.token.clone(),
        time_format: config.widget.time_format.clone(),
    };
    let identity = RequestIdentity::generate();
    info!("Widget instance {} starting", identity.raw());
    let mut scheduler = Scheduler::new(identity, target, config.widget.update_interval);

    let (request_tx, request_rx) = mpsc::channel(CHANNEL_CAPACITY);
    let (response_tx, response_rx) = mpsc::channel(CHANNEL_CAPACITY);
    let worker = fetcher::spawn(Arc::new(source), request_rx, response_tx);

    let result = drive(&ctx, &mut scheduler, presenter, request_tx, response_rx, shutdown).await;
    worker.abort();
    result
}

async fn drive<P, F>(
    ctx: &RenderContext<'_>,
    scheduler: &mut Scheduler,
    presenter: &mut P,
    request_tx: mpsc::Sender<FetchRequest>,
    mut response_rx: mpsc::Receiver<FetchResponse>,
    shutdown: F,
) -> Result<()>
where
    P: Presenter,
    F: Future<Output = ()>,
{
    present(ctx, scheduler, presenter);

    if let Some(request) = scheduler.activate() {
        request_tx.send(request).await.context("Fetch worker stopped")?;
    }

    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("Shutting down widget");
                break;
            }
            Some(response) = response_rx.recv() => {
                trace!("NOTIFICATION {:?}", response);
                match scheduler.on_response(response) {
                    ResponseOutcome::Accepted { delay } => {
                        debug!("Snapshot accepted, next fetch in {:?}", delay);
                        present(ctx, scheduler, presenter);
                    }
                    ResponseOutcome::Stale => {}
                }
            }
            request = scheduler.next_due() => {
                request_tx.send(request).await.context("Fetch worker stopped")?;
            }
        }
    }

    Ok(())
}

/// A failed presentation is logged; the schedule carries on regardless.
fn present<P: Presenter>(ctx: &RenderContext, scheduler: &Scheduler, presenter: &mut P) {
    if let Err(e) = presenter.present(&renderer::derive(ctx, scheduler.snapshot())) {
        error!("Failed to present widget: {e:#}");
    }
}
