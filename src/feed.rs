//! Location weather feed
//!
//! Owns one map view's state: where locations come from, how they are
//! enriched, who renders them, the current presentation mode and the feature
//! set of the last completed fetch cycle.

use std::sync::{Arc, Mutex, PoisonError};

use futures::future::{AbortHandle, AbortRegistration, Abortable};
use tracing::{error, info, instrument, warn};

use crate::features::assemble_features;
use crate::locations::LocationSource;
use crate::models::FeatureSet;
use crate::presentation::{PresentationMode, RenderConfig, configure_presentation};
use crate::render::FeatureRenderer;
use crate::weather::WeatherEnricher;
use crate::{ArtisanMapError, Result};

#[derive(Default)]
struct HandleState {
    in_flight: Option<AbortHandle>,
    shut_down: bool,
}

/// Cloneable teardown handle.
///
/// Shutting down aborts the in-flight fetch cycle, if any, and makes every
/// later refresh fail with [`ArtisanMapError::Cancelled`].
#[derive(Clone, Default)]
pub struct FeedHandle {
    state: Arc<Mutex<HandleState>>,
}

impl FeedHandle {
    pub fn shutdown(&self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.shut_down = true;
        if let Some(in_flight) = state.in_flight.take() {
            in_flight.abort();
        }
    }

    #[must_use]
    pub fn is_shut_down(&self) -> bool {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .shut_down
    }

    fn register(&self) -> Result<AbortRegistration> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.shut_down {
            return Err(ArtisanMapError::Cancelled);
        }
        let (handle, registration) = AbortHandle::new_pair();
        state.in_flight = Some(handle);
        Ok(registration)
    }

    fn finish(&self) {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .in_flight = None;
    }
}

/// Presentation mode shared between a feed and anything that restyles its
/// renderer without holding the feed.
///
/// A mode switch and the render at the end of a fetch cycle both run under
/// this lock, so a cycle always renders with the latest mode.
#[derive(Clone, Default)]
pub struct ModeCell {
    mode: Arc<Mutex<PresentationMode>>,
}

impl ModeCell {
    #[must_use]
    pub fn get(&self) -> PresentationMode {
        *self.mode.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Set `mode` and hand its render config to `apply` while holding the lock.
    /// The mode is left unchanged if `apply` fails.
    pub fn switch(
        &self,
        mode: PresentationMode,
        apply: impl FnOnce(&RenderConfig) -> Result<()>,
    ) -> Result<RenderConfig> {
        let mut current = self.mode.lock().unwrap_or_else(PoisonError::into_inner);
        let config = configure_presentation(mode);
        apply(&config)?;
        if *current != mode {
            info!("Presentation mode changed: {} -> {}", *current, mode);
        }
        *current = mode;
        Ok(config)
    }

    fn with<T>(&self, f: impl FnOnce(PresentationMode) -> T) -> T {
        let current = self.mode.lock().unwrap_or_else(PoisonError::into_inner);
        f(*current)
    }
}

pub struct LocationWeatherFeed<R: FeatureRenderer> {
    source: Arc<dyn LocationSource>,
    enricher: WeatherEnricher,
    renderer: R,
    mode: ModeCell,
    features: FeatureSet,
    handle: FeedHandle,
}

impl<R: FeatureRenderer> LocationWeatherFeed<R> {
    pub fn new(source: Arc<dyn LocationSource>, enricher: WeatherEnricher, renderer: R) -> Self {
        Self {
            source,
            enricher,
            renderer,
            mode: ModeCell::default(),
            features: FeatureSet::empty(),
            handle: FeedHandle::default(),
        }
    }

    #[must_use]
    pub fn mode(&self) -> PresentationMode {
        self.mode.get()
    }

    /// Shared mode, for switching modes while a refresh holds the feed
    #[must_use]
    pub fn mode_cell(&self) -> ModeCell {
        self.mode.clone()
    }

    /// Feature set of the last completed cycle
    #[must_use]
    pub fn features(&self) -> &FeatureSet {
        &self.features
    }

    #[must_use]
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    #[must_use]
    pub fn handle(&self) -> FeedHandle {
        self.handle.clone()
    }

    /// Run one fetch cycle and hand the result to the renderer.
    ///
    /// A failed or empty location fetch renders an empty map rather than an
    /// error. Only teardown and renderer failures surface as `Err`.
    #[instrument(skip(self), fields(mode = %self.mode()))]
    pub async fn refresh(&mut self) -> Result<&FeatureSet> {
        let registration = self.handle.register()?;
        let cycle = Abortable::new(
            Self::fetch_cycle(self.source.as_ref(), &self.enricher),
            registration,
        );
        let outcome = cycle.await;
        self.handle.finish();

        let Ok(features) = outcome else {
            warn!("Fetch cycle aborted by teardown");
            return Err(ArtisanMapError::Cancelled);
        };

        let renderer = &mut self.renderer;
        self.mode
            .with(|mode| renderer.render_features(&features, &configure_presentation(mode)))?;
        info!(
            "Rendered {} features ({})",
            features.len(),
            features.summary.panel_lines().join(", ")
        );
        self.features = features;
        Ok(&self.features)
    }

    async fn fetch_cycle(source: &dyn LocationSource, enricher: &WeatherEnricher) -> FeatureSet {
        let records = match source.fetch_locations().await {
            Ok(records) if !records.is_empty() => records,
            Ok(_) => {
                warn!("Location source returned no rows; nothing to render");
                return FeatureSet::empty();
            }
            Err(err) => {
                error!("Location fetch failed, aborting cycle: {}", err);
                return FeatureSet::empty();
            }
        };

        assemble_features(enricher.enrich(records).await)
    }

    /// Restyle the current features for `mode`. Never fetches.
    pub fn set_mode(&mut self, mode: PresentationMode) -> Result<RenderConfig> {
        let renderer = &mut self.renderer;
        self.mode.switch(mode, |config| renderer.apply_config(config))
    }

    pub fn toggle_mode(&mut self) -> Result<RenderConfig> {
        self.set_mode(self.mode().toggled())
    }

    /// Abort any in-flight cycle and release the renderer
    pub fn shutdown(&mut self) -> Result<()> {
        self.handle.shutdown();
        self.renderer.release()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LocationRecord, WeatherSample};
    use crate::render::SnapshotRenderer;
    use crate::weather::testing::ScriptedWeather;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    enum Rows {
        Fixed(Vec<LocationRecord>),
        Fail,
        Hang,
    }

    struct StubSource {
        rows: Rows,
        calls: AtomicUsize,
    }

    impl StubSource {
        fn new(rows: Rows) -> Arc<Self> {
            Arc::new(Self {
                rows,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl LocationSource for StubSource {
        async fn fetch_locations(&self) -> Result<Vec<LocationRecord>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.rows {
                Rows::Fixed(rows) => Ok(rows.clone()),
                Rows::Fail => Err(ArtisanMapError::location_source("rpc down")),
                Rows::Hang => {
                    futures::future::pending::<()>().await;
                    Ok(Vec::new())
                }
            }
        }
    }

    #[derive(Default)]
    struct RecordingRenderer {
        renders: Vec<FeatureSet>,
        configs: Vec<RenderConfig>,
        released: bool,
    }

    impl FeatureRenderer for RecordingRenderer {
        fn render_features(&mut self, features: &FeatureSet, config: &RenderConfig) -> Result<()> {
            self.renders.push(features.clone());
            self.configs.push(config.clone());
            Ok(())
        }

        fn apply_config(&mut self, config: &RenderConfig) -> Result<()> {
            self.configs.push(config.clone());
            Ok(())
        }

        fn release(&mut self) -> Result<()> {
            self.released = true;
            Ok(())
        }
    }

    fn three_artisans() -> Vec<LocationRecord> {
        vec![
            LocationRecord::new("1", "Sualkuchi Weavers", "Silk", "Kamrup", 20.0, 91.57),
            LocationRecord::new("2", "Majuli Masks", "Masks", "Majuli", 22.0, 94.17),
            LocationRecord::new("3", "Asharikandi Terracotta", "Pottery", "Dhubri", 30.0, 90.0),
        ]
    }

    fn feed(
        source: Arc<StubSource>,
        weather: Arc<ScriptedWeather>,
    ) -> LocationWeatherFeed<RecordingRenderer> {
        LocationWeatherFeed::new(source, WeatherEnricher::new(weather), RecordingRenderer::default())
    }

    #[tokio::test]
    async fn test_end_to_end_with_one_weather_failure() {
        let source = StubSource::new(Rows::Fixed(three_artisans()));
        let weather = Arc::new(ScriptedWeather::failing(&[30.0]));
        let mut feed = feed(source, weather.clone());

        let set = feed.refresh().await.unwrap().clone();

        assert_eq!(set.len(), 3);
        assert_eq!(weather.calls(), 3);
        let unavailable: Vec<&str> = set
            .features
            .iter()
            .filter(|f| f.weather == WeatherSample::unavailable())
            .map(|f| f.location.id.as_str())
            .collect();
        assert_eq!(unavailable, vec!["3"]);
        assert_eq!(set.summary.panel_lines()[0], "Artisans: 3");
        // scripted temperatures are latitude / 2
        assert_eq!(set.summary.mean_temperature, Some(10.5));
        assert_eq!(feed.renderer().renders.len(), 1);
        assert_eq!(feed.renderer().configs[0].mode(), PresentationMode::Cluster);
    }

    #[tokio::test]
    async fn test_empty_source_renders_nothing_and_skips_weather() {
        let weather = Arc::new(ScriptedWeather::default());
        let mut feed = feed(StubSource::new(Rows::Fixed(Vec::new())), weather.clone());

        let set = feed.refresh().await.unwrap();

        assert!(set.is_empty());
        assert_eq!(weather.calls(), 0);
        assert!(feed.renderer().renders[0].is_empty());
    }

    #[tokio::test]
    async fn test_source_failure_aborts_cycle_quietly() {
        let weather = Arc::new(ScriptedWeather::default());
        let mut feed = feed(StubSource::new(Rows::Fail), weather.clone());

        let set = feed.refresh().await.unwrap();

        assert!(set.is_empty());
        assert_eq!(weather.calls(), 0);
    }

    #[tokio::test]
    async fn test_each_refresh_rebuilds_ordinals() {
        let source = StubSource::new(Rows::Fixed(three_artisans()));
        let mut feed = feed(source.clone(), Arc::new(ScriptedWeather::default()));

        feed.refresh().await.unwrap();
        let second = feed.refresh().await.unwrap();

        let ordinals: Vec<u32> = second.features.iter().map(|f| f.ordinal).collect();
        assert_eq!(ordinals, vec![1, 2, 3]);
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_mode_change_never_refetches() {
        let source = StubSource::new(Rows::Fixed(three_artisans()));
        let weather = Arc::new(ScriptedWeather::default());
        let mut feed = feed(source.clone(), weather.clone());
        feed.refresh().await.unwrap();

        let heatmap = feed.toggle_mode().unwrap();
        let cluster = feed.set_mode(PresentationMode::Cluster).unwrap();
        let heatmap_again = feed.set_mode(PresentationMode::Heatmap).unwrap();

        assert_eq!(heatmap.mode(), PresentationMode::Heatmap);
        assert_eq!(cluster, configure_presentation(PresentationMode::Cluster));
        assert_eq!(heatmap, heatmap_again);
        assert_eq!(feed.mode(), PresentationMode::Heatmap);
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
        assert_eq!(weather.calls(), 3);
        assert_eq!(feed.features().len(), 3);
    }

    #[tokio::test]
    async fn test_mode_switched_through_cell_applies_to_next_render() {
        let renderer = SnapshotRenderer::new();
        let mut feed = LocationWeatherFeed::new(
            StubSource::new(Rows::Fixed(three_artisans())),
            WeatherEnricher::new(Arc::new(ScriptedWeather::default())),
            renderer.clone(),
        );
        let cell = feed.mode_cell();
        let mut restyler = renderer.clone();

        cell.switch(PresentationMode::Heatmap, |config| restyler.apply_config(config))
            .unwrap();
        assert_eq!(feed.mode(), PresentationMode::Heatmap);
        assert_eq!(renderer.snapshot().config.mode(), PresentationMode::Heatmap);

        feed.refresh().await.unwrap();
        assert_eq!(renderer.snapshot().config.mode(), PresentationMode::Heatmap);
        assert_eq!(renderer.snapshot().summary.count, 3);
    }

    #[test]
    fn test_failed_apply_keeps_previous_mode() {
        let cell = ModeCell::default();

        let err = cell
            .switch(PresentationMode::Heatmap, |_| Err(ArtisanMapError::render("widget gone")))
            .unwrap_err();

        assert!(matches!(err, ArtisanMapError::Render { .. }));
        assert_eq!(cell.get(), PresentationMode::Cluster);
    }

    #[tokio::test]
    async fn test_refresh_uses_current_mode() {
        let mut feed = feed(
            StubSource::new(Rows::Fixed(three_artisans())),
            Arc::new(ScriptedWeather::default()),
        );
        feed.set_mode(PresentationMode::Heatmap).unwrap();

        feed.refresh().await.unwrap();

        let last = feed.renderer().configs.last().unwrap();
        assert!(last.clustering().is_none());
    }

    #[tokio::test]
    async fn test_shutdown_aborts_in_flight_refresh() {
        let mut feed = feed(StubSource::new(Rows::Hang), Arc::new(ScriptedWeather::default()));
        let handle = feed.handle();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            handle.shutdown();
        });

        let err = feed.refresh().await.unwrap_err();

        assert!(matches!(err, ArtisanMapError::Cancelled));
        assert!(feed.features().is_empty());
        assert!(feed.renderer().renders.is_empty());
        assert!(matches!(feed.refresh().await, Err(ArtisanMapError::Cancelled)));

        feed.shutdown().unwrap();
        assert!(feed.renderer().released);
    }

    #[tokio::test]
    async fn test_shutdown_releases_renderer() {
        let renderer = SnapshotRenderer::new();
        let mut feed = LocationWeatherFeed::new(
            StubSource::new(Rows::Fixed(three_artisans())),
            WeatherEnricher::new(Arc::new(ScriptedWeather::default())),
            renderer.clone(),
        );
        feed.refresh().await.unwrap();
        assert_eq!(renderer.snapshot().summary.count, 3);
        let handle = feed.handle();

        feed.shutdown().unwrap();

        assert!(handle.is_shut_down());
        assert!(renderer.snapshot().released);
        assert_eq!(renderer.snapshot().summary.count, 0);
    }
}
