//! Orchestrates the classification and doctor-lookup workflows.
//!
//! Each workflow owns one `watch` channel holding its current snapshot. All
//! writes go through this module: a start transition (guarded so that at most
//! one request per workflow is in flight) and a completion transition from
//! the spawned task. The two workflows share nothing and run independently.

use std::sync::Arc;

use dermascan_client::{summarize_prediction, ClassifyRequest, ClientError, DermascanClient};
use dermascan_core::Coordinate;
use image::DynamicImage;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::state::{
    AnalysisResult, AnalysisState, DoctorLookupState, LookupPhase, ANALYSIS_FALLBACK_MESSAGE,
    LOOKUP_FALLBACK_MESSAGE,
};

#[derive(Debug)]
struct Inner {
    client: DermascanClient,
    analysis: watch::Sender<AnalysisState>,
    doctors: watch::Sender<DoctorLookupState>,
}

/// Handle to both workflows. Clones share the same state.
///
/// Operations return immediately; network work runs on spawned tokio tasks,
/// so a `Session` must be used inside a tokio runtime.
#[derive(Debug, Clone)]
pub struct Session {
    inner: Arc<Inner>,
}

impl Session {
    #[must_use]
    pub fn new(client: DermascanClient) -> Self {
        let (analysis, _) = watch::channel(AnalysisState::default());
        let (doctors, _) = watch::channel(DoctorLookupState::default());
        Self {
            inner: Arc::new(Inner {
                client,
                analysis,
                doctors,
            }),
        }
    }

    /// Current classification snapshot.
    #[must_use]
    pub fn analysis(&self) -> AnalysisState {
        self.inner.analysis.borrow().clone()
    }

    /// Current doctor-lookup snapshot.
    #[must_use]
    pub fn doctors(&self) -> DoctorLookupState {
        self.inner.doctors.borrow().clone()
    }

    #[must_use]
    pub fn subscribe_analysis(&self) -> watch::Receiver<AnalysisState> {
        self.inner.analysis.subscribe()
    }

    #[must_use]
    pub fn subscribe_doctors(&self) -> watch::Receiver<DoctorLookupState> {
        self.inner.doctors.subscribe()
    }

    /// Select the image to analyze, clearing the previous result.
    ///
    /// Allowed while an analysis is running; the in-flight result is then
    /// discarded on arrival because it describes a different image.
    pub fn set_image(&self, image: DynamicImage) {
        let image = Arc::new(image);
        self.inner.analysis.send_modify(|state| {
            *state = AnalysisState {
                image: Some(image),
                is_analyzing: state.is_analyzing,
                result: None,
            };
        });
    }

    /// Start classifying the current image.
    ///
    /// Returns `None` without side effects when no image is set or an
    /// analysis is already in flight.
    pub fn analyze(&self) -> Option<JoinHandle<()>> {
        let mut started = None;
        self.inner.analysis.send_if_modified(|state| {
            if state.is_analyzing {
                return false;
            }
            let Some(image) = state.image.clone() else {
                return false;
            };
            started = Some(Arc::clone(&image));
            *state = AnalysisState {
                image: Some(image),
                is_analyzing: true,
                result: None,
            };
            true
        });

        let Some(image) = started else {
            tracing::debug!("analyze ignored: no image or analysis already in flight");
            return None;
        };

        tracing::info!(
            width = image.width(),
            height = image.height(),
            "starting skin analysis"
        );
        let inner = Arc::clone(&self.inner);
        Some(tokio::spawn(async move {
            let result = run_analysis(&inner.client, Arc::clone(&image)).await;
            inner.analysis.send_modify(|state| {
                let current = state.image.clone();
                let same_image = current
                    .as_ref()
                    .is_some_and(|current| Arc::ptr_eq(current, &image));
                if !same_image {
                    tracing::debug!("image replaced during analysis; dropping stale result");
                }
                *state = AnalysisState {
                    image: current,
                    is_analyzing: false,
                    result: if same_image {
                        Some(result)
                    } else {
                        state.result.take()
                    },
                };
            });
        }))
    }

    /// Start a provider lookup around the user's position.
    ///
    /// Returns `None` without side effects when a lookup is already in flight.
    /// An invalid coordinate fails the lookup immediately without a request.
    pub fn fetch_nearby_doctors(&self, latitude: f64, longitude: f64) -> Option<JoinHandle<()>> {
        let started = self.inner.doctors.send_if_modified(|state| {
            if state.is_loading() {
                return false;
            }
            *state = DoctorLookupState {
                phase: LookupPhase::Loading,
                providers: Vec::new(),
            };
            true
        });

        if !started {
            tracing::debug!("doctor lookup ignored: lookup already in flight");
            return None;
        }

        let inner = Arc::clone(&self.inner);
        Some(tokio::spawn(async move {
            let next = match Coordinate::new(latitude, longitude) {
                Ok(user) => run_lookup(&inner.client, user).await,
                Err(err) => {
                    tracing::warn!(%err, "rejecting doctor lookup for invalid location");
                    DoctorLookupState {
                        phase: LookupPhase::Failed(format!("Invalid location: {err}")),
                        providers: Vec::new(),
                    }
                }
            };
            inner.doctors.send_replace(next);
        }))
    }

    /// Record that the user refused location access. No request is made.
    ///
    /// Ignored while a lookup is in flight so that its completion stays the
    /// only writer.
    pub fn location_permission_denied(&self) {
        let applied = self.inner.doctors.send_if_modified(|state| {
            if state.is_loading() {
                return false;
            }
            *state = DoctorLookupState {
                phase: LookupPhase::PermissionDenied,
                providers: Vec::new(),
            };
            true
        });
        if applied {
            tracing::info!("location permission denied; doctor lookup skipped");
        }
    }
}

async fn run_analysis(client: &DermascanClient, image: Arc<DynamicImage>) -> AnalysisResult {
    // JPEG encoding is CPU-bound; keep it off the async workers.
    let encoded = tokio::task::spawn_blocking(move || ClassifyRequest::from_image(&image)).await;
    let request = match encoded {
        Ok(Ok(request)) => request,
        Ok(Err(err)) => return analysis_failure(&err),
        Err(err) => {
            tracing::error!(%err, "image encoding task failed");
            return AnalysisResult::Failed(ANALYSIS_FALLBACK_MESSAGE.to_string());
        }
    };

    match client.send_classify(&request).await {
        Ok(body) => {
            let label = summarize_prediction(&body);
            tracing::info!(%label, "skin analysis finished");
            AnalysisResult::Label(label)
        }
        Err(err) => analysis_failure(&err),
    }
}

fn analysis_failure(err: &ClientError) -> AnalysisResult {
    tracing::warn!(%err, "skin analysis failed");
    AnalysisResult::Failed(display_message(err, ANALYSIS_FALLBACK_MESSAGE))
}

async fn run_lookup(client: &DermascanClient, user: Coordinate) -> DoctorLookupState {
    tracing::info!(lat = user.lat, lon = user.lon, "looking up nearby doctors");
    match client.nearby_providers(user).await {
        Ok(providers) if providers.is_empty() => {
            tracing::info!("no providers found nearby");
            DoctorLookupState {
                phase: LookupPhase::NoResults,
                providers,
            }
        }
        Ok(providers) => {
            tracing::info!(count = providers.len(), "doctor lookup finished");
            DoctorLookupState {
                phase: LookupPhase::Populated,
                providers,
            }
        }
        Err(err) => {
            tracing::warn!(%err, "doctor lookup failed");
            DoctorLookupState {
                phase: LookupPhase::Failed(display_message(&err, LOOKUP_FALLBACK_MESSAGE)),
                providers: Vec::new(),
            }
        }
    }
}

fn display_message(err: &ClientError, fallback: &str) -> String {
    let message = err.to_string();
    if message.trim().is_empty() {
        fallback.to_string()
    } else {
        message
    }
}
