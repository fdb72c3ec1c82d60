//! Loading saved drawings and turning them into LOD meshes.
//!
//! [`DrawingLoader`] is a small state machine driven by the host's frame
//! loop. The file is decoded on a background thread; once it arrives, one
//! stroke is meshed per [`tick`](DrawingLoader::tick) so a large drawing
//! never stalls a frame.

use std::path::{Path, PathBuf};

use rayon::prelude::*;
use vstroke_math::{ground_offset, Rgba, Vec3};
use vstroke_model::{codec, StrokeCollection, StrokeRecord};
use vstroke_ribbon::{BatchRibbonBuilder, LodMesh};

use crate::error::{Error, Result};
use crate::palette::MaterialResolver;
use crate::settings::DrawingSettings;
use crate::task::BackgroundTask;

/// Where a [`DrawingLoader`] is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    /// Created, nothing started.
    Standby,
    /// Decoding on the background thread.
    Loading,
    /// Decoded; strokes are being built.
    Loaded,
    /// Decoding failed.
    Error,
    /// Every stroke has been built.
    Complete,
}

/// A stroke ready for rendering.
#[derive(Debug, Clone)]
pub struct BuiltStroke<H> {
    /// Position in the drawing, 0-based.
    pub index: usize,
    /// Display name, `Stroke_000` for the first.
    pub name: String,
    /// Colour of the stroke's first sample.
    pub color: Rgba,
    /// Material handle resolved from `color`.
    pub material: H,
    /// One mesh per level of detail, finest first.
    pub lods: Vec<LodMesh>,
    /// Offset subtracted from every vertex.
    pub offset: Vec3,
}

/// Display name for the stroke at 0-based `index`.
pub fn stroke_name(index: usize) -> String {
    format!("Stroke_{:03}", index)
}

/// Build one stroke's LODs.
///
/// Empty records have no colour to resolve and yield `None`.
pub fn build_stroke<R: MaterialResolver>(
    index: usize,
    record: &StrokeRecord,
    settings: &DrawingSettings,
    offset: Vec3,
    resolver: &R,
) -> Option<BuiltStroke<R::Handle>> {
    let color = record.samples().first()?.color;
    let builder = BatchRibbonBuilder::new(settings.min_segment_size).with_offset(offset);
    Some(BuiltStroke {
        index,
        name: stroke_name(index),
        color,
        material: resolver.resolve(color),
        lods: builder.build_lods(record, settings.lod_levels),
        offset,
    })
}

/// Offset applied to every stroke of `strokes` under `settings`.
///
/// With relative placement the drawing is moved so its average sits over
/// the origin, keeping its height.
pub fn placement_offset(strokes: &StrokeCollection, settings: &DrawingSettings) -> Vec3 {
    if settings.relative_placement {
        ground_offset(&strokes.average().coords)
    } else {
        Vec3::zeros()
    }
}

/// Build every stroke of `strokes` at once, in parallel.
pub fn build_all<R>(strokes: &StrokeCollection, settings: &DrawingSettings, resolver: &R) -> Vec<BuiltStroke<R::Handle>>
where
    R: MaterialResolver + Sync,
    R::Handle: Send,
{
    let offset = placement_offset(strokes, settings);
    strokes
        .records()
        .par_iter()
        .enumerate()
        .filter_map(|(index, record)| build_stroke(index, record, settings, offset, resolver))
        .collect()
}

/// Loads one drawing file and builds its strokes incrementally.
#[derive(Debug)]
pub struct DrawingLoader<H> {
    path: PathBuf,
    settings: DrawingSettings,
    state: LoadState,
    task: Option<BackgroundTask<StrokeCollection>>,
    collection: StrokeCollection,
    offset: Vec3,
    next_stroke: usize,
    built: Vec<BuiltStroke<H>>,
    last_error: Option<String>,
}

impl<H> DrawingLoader<H> {
    /// Loader for the drawing at `path` (`.csv` is appended when decoding).
    pub fn new(path: impl Into<PathBuf>, settings: DrawingSettings) -> Self {
        Self {
            path: path.into(),
            settings,
            state: LoadState::Standby,
            task: None,
            collection: StrokeCollection::new(),
            offset: Vec3::zeros(),
            next_stroke: 0,
            built: Vec::new(),
            last_error: None,
        }
    }

    /// Current state.
    pub fn state(&self) -> LoadState {
        self.state
    }

    /// Path given at construction.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Settings in use.
    pub fn settings(&self) -> &DrawingSettings {
        &self.settings
    }

    /// The decoded drawing; empty until the decode finishes.
    pub fn collection(&self) -> &StrokeCollection {
        &self.collection
    }

    /// Strokes built so far, in file order.
    pub fn strokes(&self) -> &[BuiltStroke<H>] {
        &self.built
    }

    /// Offset applied to every stroke.
    pub fn offset(&self) -> Vec3 {
        self.offset
    }

    /// Why loading failed, in the `Error` state.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Start decoding in the background. Only valid in `Standby`.
    pub fn start_loading(&mut self) -> Result<()> {
        if self.state != LoadState::Standby {
            return Err(Error::InvalidState(format!(
                "cannot start loading in state {:?}",
                self.state
            )));
        }
        let path = self.path.clone();
        let task = BackgroundTask::spawn("vstroke-load", move || Ok(codec::decode_path(path)?))?;
        self.task = Some(task);
        self.state = LoadState::Loading;
        log::debug!("loading {}", self.path.display());
        Ok(())
    }

    /// Advance by one frame.
    ///
    /// While loading, checks for the decoded drawing. While loaded, builds
    /// the next stroke. Other states are left alone.
    pub fn tick<R>(&mut self, resolver: &R) -> LoadState
    where
        R: MaterialResolver<Handle = H>,
    {
        match self.state {
            LoadState::Loading => self.poll_decode(),
            LoadState::Loaded => self.build_next(resolver),
            LoadState::Standby | LoadState::Error | LoadState::Complete => {}
        }
        self.state
    }

    fn poll_decode(&mut self) {
        let Some(task) = self.task.as_mut() else {
            return;
        };
        let Some(result) = task.poll() else {
            return;
        };
        self.task = None;
        match result {
            Ok(collection) => {
                log::info!(
                    "loaded {} strokes ({} samples) from {}",
                    collection.len(),
                    collection.sample_count(),
                    self.path.display()
                );
                self.offset = placement_offset(&collection, &self.settings);
                self.state = if collection.is_empty() {
                    LoadState::Complete
                } else {
                    LoadState::Loaded
                };
                self.collection = collection;
            }
            Err(e) => {
                log::warn!("failed to load {}: {}", self.path.display(), e);
                self.last_error = Some(e.to_string());
                self.state = LoadState::Error;
            }
        }
    }

    fn build_next<R>(&mut self, resolver: &R)
    where
        R: MaterialResolver<Handle = H>,
    {
        let index = self.next_stroke;
        if let Some(record) = self.collection.get(index) {
            if let Some(stroke) = build_stroke(index, record, &self.settings, self.offset, resolver) {
                self.built.push(stroke);
            }
            self.next_stroke += 1;
        }
        if self.next_stroke >= self.collection.len() {
            log::debug!("built {} strokes from {}", self.built.len(), self.path.display());
            self.state = LoadState::Complete;
        }
    }
}

/// Encode `strokes` to `path` (`.csv` appended) on a background thread.
pub fn save_drawing(strokes: StrokeCollection, path: impl Into<PathBuf>) -> Result<BackgroundTask<()>> {
    let path = path.into();
    BackgroundTask::spawn("vstroke-save", move || Ok(codec::encode_path(&strokes, path)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::time::Duration;
    use vstroke_math::{Point3, Quat};
    use vstroke_model::StrokeSample;

    fn sample(t: f64, p: Point3, color: Rgba) -> StrokeSample {
        StrokeSample::new(t, p, Quat::identity(), 0.02, color)
    }

    fn drawing() -> StrokeCollection {
        let red = Rgba::rgb(1.0, 0.0, 0.0);
        let blue = Rgba::rgb(0.0, 0.0, 1.0);
        let a = StrokeRecord::from_samples((0..5).map(|i| sample(i as f64, Point3::new(i as f64, 1.0, 2.0), red)).collect());
        let b = StrokeRecord::from_samples((0..3).map(|i| sample(i as f64, Point3::new(4.0, 3.0, i as f64), blue)).collect());
        [a, b].into_iter().collect()
    }

    fn tick_until<R: MaterialResolver<Handle = H>, H>(loader: &mut DrawingLoader<H>, resolver: &R, state: LoadState) {
        for _ in 0..10_000 {
            if loader.tick(resolver) == state {
                return;
            }
            std::thread::sleep(Duration::from_millis(1));
        }
        panic!("loader stuck in {:?}", loader.state());
    }

    #[test]
    fn test_stroke_name() {
        assert_eq!(stroke_name(0), "Stroke_000");
        assert_eq!(stroke_name(12), "Stroke_012");
        assert_eq!(stroke_name(1234), "Stroke_1234");
    }

    #[test]
    fn test_build_stroke_uses_first_colour() {
        let strokes = drawing();
        let settings = DrawingSettings {
            lod_levels: 2,
            ..Default::default()
        };
        let built = build_stroke(1, &strokes[1], &settings, Vec3::zeros(), &|c: Rgba| c.b).unwrap();
        assert_eq!(built.name, "Stroke_001");
        assert_eq!(built.material, 1.0);
        assert_eq!(built.lods.len(), 2);
        assert!(built.lods[1].never_cull);
    }

    #[test]
    fn test_build_stroke_skips_empty_record() {
        let settings = DrawingSettings::default();
        assert!(build_stroke(0, &StrokeRecord::new(), &settings, Vec3::zeros(), &|_c: Rgba| ()).is_none());
    }

    #[test]
    fn test_placement_offset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("drawing");
        codec::encode_path(&drawing(), &path).unwrap();
        let strokes = codec::decode_path(&path).unwrap();

        let absolute = placement_offset(&strokes, &DrawingSettings::default());
        assert_eq!(absolute, Vec3::zeros());

        let settings = DrawingSettings {
            relative_placement: true,
            ..Default::default()
        };
        let relative = placement_offset(&strokes, &settings);
        // x: (0+1+2+3+4+4+4+4)/8, z: (2*5+0+1+2)/8
        assert_relative_eq!(relative, Vec3::new(22.0 / 8.0, 0.0, 13.0 / 8.0), epsilon = 1e-12);
    }

    #[test]
    fn test_build_all_in_order() {
        let strokes = drawing();
        let built = build_all(&strokes, &DrawingSettings::default(), &|c: Rgba| c.r > 0.5);
        assert_eq!(built.len(), 2);
        assert_eq!(built[0].index, 0);
        assert!(built[0].material);
        assert_eq!(built[1].name, "Stroke_001");
        assert!(!built[1].material);
        assert_eq!(built[0].lods[0].mesh.cross_section_count(), 5);
    }

    #[test]
    fn test_loader_builds_one_stroke_per_tick() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("two");
        codec::encode_path(&drawing(), &path).unwrap();

        let resolver = |c: Rgba| c.r;
        let mut loader = DrawingLoader::new(&path, DrawingSettings::default());
        assert_eq!(loader.state(), LoadState::Standby);
        assert_eq!(loader.tick(&resolver), LoadState::Standby);

        loader.start_loading().unwrap();
        tick_until(&mut loader, &resolver, LoadState::Loaded);
        assert_eq!(loader.collection().len(), 2);
        assert!(loader.strokes().is_empty());

        assert_eq!(loader.tick(&resolver), LoadState::Loaded);
        assert_eq!(loader.strokes().len(), 1);
        assert_eq!(loader.tick(&resolver), LoadState::Complete);
        assert_eq!(loader.strokes().len(), 2);
        assert_eq!(loader.strokes()[1].material, 0.0);

        // nothing more to do
        assert_eq!(loader.tick(&resolver), LoadState::Complete);
        assert_eq!(loader.strokes().len(), 2);
    }

    #[test]
    fn test_loader_missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = |_c: Rgba| ();
        let mut loader = DrawingLoader::new(dir.path().join("missing"), DrawingSettings::default());
        loader.start_loading().unwrap();
        tick_until(&mut loader, &resolver, LoadState::Error);
        assert!(loader.last_error().is_some());
        assert!(loader.strokes().is_empty());
        assert_eq!(loader.tick(&resolver), LoadState::Error);
    }

    #[test]
    fn test_loader_header_only_completes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty");
        codec::encode_path(&StrokeCollection::new(), &path).unwrap();
        let resolver = |_c: Rgba| ();
        let mut loader = DrawingLoader::new(&path, DrawingSettings::default());
        loader.start_loading().unwrap();
        tick_until(&mut loader, &resolver, LoadState::Complete);
        assert!(loader.strokes().is_empty());
    }

    #[test]
    fn test_start_twice_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut loader: DrawingLoader<()> = DrawingLoader::new(dir.path().join("x"), DrawingSettings::default());
        loader.start_loading().unwrap();
        assert!(matches!(loader.start_loading(), Err(Error::InvalidState(_))));
    }

    #[test]
    fn test_save_drawing_in_background() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("saved");
        save_drawing(drawing(), &path).unwrap().wait().unwrap();
        let back = codec::decode_path(&path).unwrap();
        assert_eq!(back.len(), 2);
        assert_eq!(back.sample_count(), 8);
    }
}
