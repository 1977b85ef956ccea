use crate::{
    constants::{
        TL_DIR,
        localization::{
            DATASET_FAILED_MSG, DUMP_FINISHED_MSG, DUMP_STARTED_MSG,
        },
    },
    datasets::DumpContext,
    game::{GameFileSystem, LanguageSource, NoTranslations, TranslationLookup},
    types::{Dataset, DumpFlags, DumpOptions, Error},
};
use log::{info, warn};
use std::{
    future::Future,
    path::{Path, PathBuf},
    pin::Pin,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    task::{Context, Poll, Wake, Waker},
};

/// The host collaborators a dump reads from.
#[derive(Clone, Copy)]
pub struct GameContext<'a> {
    pub files: &'a dyn GameFileSystem,
    pub translations: &'a dyn TranslationLookup,
    pub language_sources: &'a [&'a dyn LanguageSource],
}

impl<'a> GameContext<'a> {
    /// A context with no stored translations and no UI language sources.
    #[must_use]
    pub fn new(files: &'a dyn GameFileSystem) -> Self {
        Self {
            files,
            translations: &NoTranslations,
            language_sources: &[],
        }
    }

    #[must_use]
    pub fn with_translations(mut self, translations: &'a dyn TranslationLookup) -> Self {
        self.translations = translations;
        self
    }

    #[must_use]
    pub fn with_language_sources(
        mut self,
        language_sources: &'a [&'a dyn LanguageSource],
    ) -> Self {
        self.language_sources = language_sources;
        self
    }
}

/// Outcome of one dump run.
#[derive(Debug)]
pub struct DumpReport {
    /// Every executed dataset, in execution order, with its error if it failed.
    pub results: Vec<(Dataset, Result<(), Error>)>,
    /// Script lines that came with an inline translation.
    pub translated_lines: usize,
    pub output_root: PathBuf,
}

impl DumpReport {
    /// Whether every executed dataset succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.results.iter().all(|(_, result)| result.is_ok())
    }

    /// Datasets that failed, with their errors.
    pub fn failures(&self) -> impl Iterator<Item = (Dataset, &Error)> {
        self.results
            .iter()
            .filter_map(|(dataset, result)| result.as_ref().err().map(|err| (*dataset, err)))
    }

    #[must_use]
    pub fn executed(&self) -> Vec<Dataset> {
        self.results.iter().map(|(dataset, _)| *dataset).collect()
    }
}

/// A struct used for extracting translatable text from game data into `.csv`, `.txt` and `.json` files.
///
/// The [`Dumper`] provides a configurable interface to control which datasets are extracted and where they're written.
///
/// # Fields
///
/// - `options`: Which datasets to dump and how. Use [`Dumper::set_options`] to set. See [`DumpOptions`] for more info.
/// - `output_root`: Directory the output tree is created in. Use [`Dumper::set_output_root`] to set.
///
/// # Example
///
/// ```no_run
/// use tlextract::{DirectoryFileSystem, DumpFlags, Dumper, GameContext};
///
/// let files = DirectoryFileSystem::open("C:/Game/GameData").unwrap();
///
/// let mut dumper = Dumper::new();
/// dumper.set_datasets(DumpFlags::Scripts | DumpFlags::tables());
/// let report = dumper.dump(&GameContext::new(&files)).unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct Dumper {
    options: DumpOptions,
    output_root: PathBuf,
}

impl Default for Dumper {
    fn default() -> Self {
        Self {
            options: DumpOptions::default(),
            output_root: PathBuf::from(TL_DIR),
        }
    }
}

impl Dumper {
    /// Creates a new [`Dumper`] instance with default values.
    ///
    /// By default, scripts and UI translations are dumped into `COM3D2_Localisation`, relative to the working directory.
    ///
    /// # Example
    ///
    /// ```
    /// use tlextract::Dumper;
    ///
    /// let dumper = Dumper::new();
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces all options at once. See [`DumpOptions`] for more info.
    ///
    /// # Parameters
    ///
    /// - `options` - A [`DumpOptions`] snapshot.
    pub fn set_options(&mut self, options: DumpOptions) {
        self.options = options;
    }

    /// Sets the datasets to dump. See [`DumpFlags`] for more info.
    ///
    /// # Parameters
    ///
    /// - `datasets` - [`DumpFlags`] bitflags.
    ///
    /// # Example
    ///
    /// ```
    /// use tlextract::{Dumper, DumpFlags};
    ///
    /// let mut dumper = Dumper::new();
    /// dumper.set_datasets(DumpFlags::Trophy | DumpFlags::Dance);
    /// ```
    pub fn set_datasets(&mut self, datasets: DumpFlags) {
        self.options.datasets = datasets;
    }

    /// Skips table rows whose key already has a translation, or whose text isn't Japanese.
    pub fn set_skip_translated_items(&mut self, enabled: bool) {
        self.options.skip_translated_items = enabled;
    }

    /// Sets the directory the output tree is created in.
    pub fn set_output_root<P: AsRef<Path>>(&mut self, output_root: P) {
        self.output_root = output_root.as_ref().to_path_buf();
    }

    #[must_use]
    pub fn options(&self) -> DumpOptions {
        self.options
    }

    #[must_use]
    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    /// Runs every enabled dataset, in a fixed order.
    ///
    /// A failing dataset doesn't stop the run: its error is logged and recorded in the report, and the next dataset is attempted.
    ///
    /// # Parameters
    ///
    /// - `game` - The game data to extract from.
    ///
    /// # Errors
    ///
    /// - [`Error::Io`] - if the output root can't be created.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use tlextract::{Dumper, GameContext, MemoryFileSystem};
    ///
    /// let files = MemoryFileSystem::new();
    /// let report = Dumper::new().dump(&GameContext::new(&files)).unwrap();
    ///
    /// assert!(report.is_success());
    /// ```
    pub fn dump(&self, game: &GameContext) -> Result<DumpReport, Error> {
        info!("{DUMP_STARTED_MSG}");

        std::fs::create_dir_all(&self.output_root)
            .map_err(|e| Error::Io(self.output_root.clone(), e))?;

        let mut context = DumpContext {
            files: game.files,
            translations: game.translations,
            language_sources: game.language_sources,
            options: self.options,
            output_root: &self.output_root,
            translated_lines: 0,
        };

        let mut results = Vec::new();

        for dataset in Dataset::ALL {
            if !self.options.datasets.contains(dataset.flag()) {
                continue;
            }

            info!("Dumping {dataset}");

            let result = match dataset {
                Dataset::UiTranslations => context.dump_ui(),
                Dataset::Scripts => context.dump_scripts(),
                Dataset::ScriptsJson => context.dump_scripts_json(),
                Dataset::ItemNames => context.dump_item_names(),
                Dataset::MaidStatus => context.dump_maid_status(),
                Dataset::Yotogi => context.dump_yotogi(),
                Dataset::ScenarioEvents => context.dump_scenario_events(),
                Dataset::HoneymoonEvents => context.dump_honeymoon_events(),
                Dataset::PrivateModeEvents => {
                    context.dump_private_mode_events()
                }
                Dataset::Memory => context.dump_memory(),
                Dataset::Schedule => context.dump_schedule(),
                Dataset::Trophy => context.dump_trophy(),
                Dataset::Npc => context.dump_npc(),
                Dataset::Guest => context.dump_guest(),
                Dataset::Dance => context.dump_dance(),
                Dataset::Mansion => context.dump_mansion(),
            };

            if let Err(err) = &result {
                warn!("{dataset}: {err}. {DATASET_FAILED_MSG}");
            }

            results.push((dataset, result));
        }

        if self.options.datasets.contains(DumpFlags::Scripts) {
            info!("Dumped {} lines", context.translated_lines);
        }

        info!("{DUMP_FINISHED_MSG} {}.", self.output_root.display());

        Ok(DumpReport {
            results,
            translated_lines: context.translated_lines,
            output_root: self.output_root.clone(),
        })
    }
}

/// A builder struct for [`Dumper`].
///
/// # Example
///
/// ```
/// use tlextract::{DumperBuilder, DumpFlags};
///
/// let dumper = DumperBuilder::new()
///     .with_datasets(DumpFlags::Scripts | DumpFlags::Yotogi)
///     .skip_translated_items(true)
///     .build();
/// ```
#[derive(Default)]
pub struct DumperBuilder {
    dumper: Dumper,
}

impl DumperBuilder {
    /// Creates a new [`DumperBuilder`] instance with default values. See [`Dumper::new`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets all options at once. See [`DumpOptions`] for more info.
    ///
    /// # Parameters
    ///
    /// - `options` - A [`DumpOptions`] snapshot.
    #[must_use]
    pub fn with_options(mut self, options: DumpOptions) -> Self {
        self.dumper.options = options;
        self
    }

    /// Sets the datasets to dump. See [`DumpFlags`] for more info.
    ///
    /// # Parameters
    ///
    /// - `datasets` - [`DumpFlags`] bitflags.
    #[must_use]
    pub fn with_datasets(mut self, datasets: DumpFlags) -> Self {
        self.dumper.options.datasets = datasets;
        self
    }

    #[must_use]
    pub fn skip_translated_items(mut self, enabled: bool) -> Self {
        self.dumper.options.skip_translated_items = enabled;
        self
    }

    /// Logs every extracted dialogue line at debug level.
    #[must_use]
    pub fn debug(mut self, enabled: bool) -> Self {
        self.dumper.options.debug = enabled;
        self
    }

    #[must_use]
    pub fn output_root<P: AsRef<Path>>(mut self, output_root: P) -> Self {
        self.dumper.output_root = output_root.as_ref().to_path_buf();
        self
    }

    #[must_use]
    pub fn build(self) -> Dumper {
        self.dumper
    }
}

/// Clears the busy flag when dropped.
struct BusyGuard {
    busy: Arc<AtomicBool>,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

/// Gate that allows one dump at a time, for hosts that start dumps from a UI action.
///
/// # Example
///
/// ```
/// use std::task::Poll;
/// use tlextract::{DumpOptions, DumpSession, GameContext, MemoryFileSystem};
///
/// let files = MemoryFileSystem::new();
/// let session = DumpSession::new(std::env::temp_dir().join("tlextract-doc"));
///
/// let mut task = session.start(DumpOptions::default(), GameContext::new(&files)).unwrap();
/// assert!(session.is_busy());
/// assert!(task.poll_frame().is_pending());
///
/// let Poll::Ready(report) = task.poll_frame() else { unreachable!() };
/// assert!(report.is_ok());
/// assert!(!session.is_busy());
/// ```
#[derive(Debug, Clone)]
pub struct DumpSession {
    busy: Arc<AtomicBool>,
    output_root: PathBuf,
}

impl Default for DumpSession {
    fn default() -> Self {
        Self::new(TL_DIR)
    }
}

impl DumpSession {
    #[must_use]
    pub fn new<P: AsRef<Path>>(output_root: P) -> Self {
        Self {
            busy: Arc::new(AtomicBool::new(false)),
            output_root: output_root.as_ref().to_path_buf(),
        }
    }

    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Starts a dump with a copy of `options`. Later changes to the host's options don't affect it.
    ///
    /// # Errors
    ///
    /// - [`Error::Busy`] - if a dump is already in progress.
    pub fn start<'a>(
        &self,
        options: DumpOptions,
        game: GameContext<'a>,
    ) -> Result<DumpTask<'a>, Error> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| Error::Busy)?;

        let dumper = DumperBuilder::new()
            .with_options(options)
            .output_root(&self.output_root)
            .build();

        Ok(DumpTask {
            dumper,
            game,
            stage: Stage::Yield,
            guard: Some(BusyGuard {
                busy: Arc::clone(&self.busy),
            }),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Yield,
    Run,
    Done,
}

struct FrameWaker;

impl Wake for FrameWaker {
    fn wake(self: Arc<Self>) {}
}

/// A started dump. Suspends once, so the host gets a frame in, then runs to completion.
///
/// Polling a finished task returns [`Poll::Pending`].
pub struct DumpTask<'a> {
    dumper: Dumper,
    game: GameContext<'a>,
    stage: Stage,
    guard: Option<BusyGuard>,
}

impl DumpTask<'_> {
    /// Advances the task by one host frame.
    pub fn poll_frame(&mut self) -> Poll<Result<DumpReport, Error>> {
        let waker = Waker::from(Arc::new(FrameWaker));
        Pin::new(self).poll(&mut Context::from_waker(&waker))
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.stage == Stage::Done
    }
}

impl Future for DumpTask<'_> {
    type Output = Result<DumpReport, Error>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let task = self.get_mut();

        match task.stage {
            Stage::Yield => {
                task.stage = Stage::Run;
                cx.waker().wake_by_ref();
                Poll::Pending
            }
            Stage::Run => {
                task.stage = Stage::Done;
                let report = task.dumper.dump(&task.game);
                task.guard.take();
                Poll::Ready(report)
            }
            Stage::Done => Poll::Pending,
        }
    }
}
