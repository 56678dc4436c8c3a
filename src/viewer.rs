use crate::session::SessionStore;
use crate::worker::{Event, Job, PageBitmap};

pub const ZOOM_MIN: f64 = 0.1;
pub const ZOOM_MAX: f64 = 8.0;

/// Lifecycle of the displayed document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No document open.
    Empty,
    /// A render request is in flight.
    Loading,
    /// Bitmap displayed, awaiting input.
    Ready,
}

/// The viewer controller: in-memory view state for the open document, and
/// the translation of UI events into render jobs. Methods that need a new
/// rasterization return a [`Job`] for the caller to submit to the render
/// worker; completions come back through [`Viewer::handle_event`].
///
/// Every job carries a generation counter. Issuing a new job bumps the
/// counter, so a completion from a superseded request is recognized and
/// discarded instead of repainting stale content.
pub struct Viewer {
    pub phase: Phase,
    pub path: Option<String>,
    pub page_count: i32,
    /// Last committed page, synced from render completions.
    pub current_page: i32,
    pub zoom: f64,
    pub inverted: bool,
    pub two_page_spread: bool,
    pub centered: bool,
    /// Most recent open failure, shown in the status bar until the next open.
    pub last_error: Option<String>,
    generation: u64,
    /// Generation of the latest open job. Open outcomes are matched against
    /// this, not `generation`: a zoom or toggle issued while the open is in
    /// flight bumps the view generation but must not drop the open's result.
    open_generation: u64,
    /// Page of the in-flight render request, if any. Navigation steps from
    /// here so rapid key presses advance past pages still being rendered.
    pending_page: Option<i32>,
}

impl Default for Viewer {
    fn default() -> Self {
        Self::new()
    }
}

impl Viewer {
    pub fn new() -> Self {
        Self {
            phase: Phase::Empty,
            path: None,
            page_count: 0,
            current_page: 0,
            zoom: 1.0,
            inverted: false,
            two_page_spread: false,
            centered: false,
            last_error: None,
            generation: 0,
            open_generation: 0,
            pending_page: None,
        }
    }

    /// Open a document, restoring persisted view state if the path has been
    /// seen before (defaults: page 0, zoom 1.0, not inverted). The returned
    /// job makes the worker release the prior handle, open the new document,
    /// and render the restored page.
    pub fn open(&mut self, path: String, store: Option<&SessionStore>) -> Job {
        let saved = store.and_then(|s| match s.get(&path) {
            Ok(record) => record,
            Err(e) => {
                log::warn!("Failed to load saved state for {}: {}", path, e);
                None
            }
        });
        let (page, zoom, inverted) = saved
            .map(|r| (r.page.max(0), r.zoom, r.inverted))
            .unwrap_or((0, 1.0, false));

        self.generation += 1;
        self.open_generation = self.generation;
        self.phase = Phase::Loading;
        self.path = Some(path.clone());
        self.page_count = 0;
        self.current_page = page;
        self.zoom = zoom.clamp(ZOOM_MIN, ZOOM_MAX);
        self.inverted = inverted;
        self.last_error = None;
        self.pending_page = Some(page);

        Job::Open {
            generation: self.generation,
            path,
            page,
            zoom: self.zoom,
            invert: self.inverted,
            spread: self.two_page_spread,
        }
    }

    /// Step forward or backward by `delta` pages (double step in spread
    /// mode). A target outside the document is a no-op.
    pub fn navigate(&mut self, delta: i32) -> Option<Job> {
        let step = if self.two_page_spread { 2 } else { 1 };
        let base = self.pending_page.unwrap_or(self.current_page);
        self.go_to_page(base + delta * step)
    }

    /// Jump to an absolute page index. Out of range is a no-op.
    pub fn go_to_page(&mut self, page: i32) -> Option<Job> {
        if self.phase == Phase::Empty || page < 0 || page >= self.page_count {
            return None;
        }
        Some(self.request_render(page))
    }

    /// Set the zoom factor (clamped) and re-render the current page.
    pub fn set_zoom(&mut self, zoom: f64) -> Option<Job> {
        self.zoom = zoom.clamp(ZOOM_MIN, ZOOM_MAX);
        self.rerender()
    }

    /// Flip colour inversion and re-render the current page.
    pub fn toggle_invert(&mut self) -> Option<Job> {
        self.inverted = !self.inverted;
        self.rerender()
    }

    /// Flip two-page spread mode and re-render the current page.
    pub fn toggle_spread(&mut self) -> Option<Job> {
        self.two_page_spread = !self.two_page_spread;
        self.rerender()
    }

    /// Flip centering. Applied at paint time; the page bitmap is unchanged,
    /// so no new rasterization is issued.
    pub fn toggle_center(&mut self) {
        self.centered = !self.centered;
    }

    /// Apply a worker completion. Completions whose generation does not
    /// match the latest issued request are discarded. Returns the bitmaps
    /// to display when a current render landed; the caller paints them and
    /// the new state has already been written through to the store.
    pub fn handle_event(
        &mut self,
        event: Event,
        store: Option<&SessionStore>,
    ) -> Option<Vec<PageBitmap>> {
        match event {
            Event::Opened {
                generation,
                page_count,
            } => {
                if generation != self.open_generation {
                    return None;
                }
                self.page_count = page_count;
                None
            }
            Event::OpenFailed { generation, error } => {
                if generation != self.open_generation {
                    return None;
                }
                log::error!("Failed to open document: {}", error);
                self.phase = Phase::Empty;
                self.path = None;
                self.page_count = 0;
                self.pending_page = None;
                self.last_error = Some(error);
                None
            }
            Event::Rendered {
                generation,
                page,
                pages,
            } => {
                if generation != self.generation {
                    log::debug!("Discarding stale render of page {}", page + 1);
                    return None;
                }
                self.pending_page = None;
                if pages.is_empty() {
                    // Rasterization failed; keep showing the previous bitmap.
                    self.phase = Phase::Ready;
                    return None;
                }
                self.current_page = page;
                self.phase = Phase::Ready;
                if let (Some(path), Some(store)) = (&self.path, store) {
                    if let Err(e) =
                        store.upsert(path, self.zoom, page, self.inverted, SessionStore::now())
                    {
                        log::warn!("Failed to persist view state for {}: {}", path, e);
                    }
                }
                Some(pages)
            }
        }
    }

    /// File name of the open document, for the window title.
    pub fn file_name(&self) -> Option<String> {
        let path = self.path.as_ref()?;
        Some(
            std::path::Path::new(path)
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| path.clone()),
        )
    }

    fn rerender(&mut self) -> Option<Job> {
        if self.phase == Phase::Empty {
            return None;
        }
        let page = self.pending_page.unwrap_or(self.current_page);
        Some(self.request_render(page))
    }

    fn request_render(&mut self, page: i32) -> Job {
        self.generation += 1;
        self.phase = Phase::Loading;
        self.pending_page = Some(page);
        Job::Render {
            generation: self.generation,
            page,
            zoom: self.zoom,
            invert: self.inverted,
            spread: self.two_page_spread,
        }
    }
}

/// Parse a 1-based page number typed into the page field. Returns the
/// 0-based page index, or `None` for non-numeric or out-of-range input (the
/// caller resets the field to the current page).
pub fn parse_page_entry(text: &str, page_count: i32) -> Option<i32> {
    let number: i32 = text.trim().parse().ok()?;
    let page = number - 1;
    (page >= 0 && page < page_count).then_some(page)
}

/// Parse a zoom percentage typed into the zoom field ("150" or "150%").
/// Returns the zoom factor, or `None` for invalid input.
pub fn parse_zoom_entry(text: &str) -> Option<f64> {
    let percent: f64 = text.trim().trim_end_matches('%').trim_end().parse().ok()?;
    (percent.is_finite() && percent > 0.0).then_some(percent / 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn bitmap() -> PageBitmap {
        PageBitmap {
            width: 1,
            height: 1,
            samples: vec![0, 0, 0, 255],
        }
    }

    fn job_generation(job: &Job) -> u64 {
        match job {
            Job::Open { generation, .. } | Job::Render { generation, .. } => *generation,
        }
    }

    fn complete(viewer: &mut Viewer, job: &Job, store: Option<&SessionStore>) {
        let generation = job_generation(job);
        let page = match job {
            Job::Open { page, .. } | Job::Render { page, .. } => *page,
        };
        viewer.handle_event(
            Event::Rendered {
                generation,
                page,
                pages: vec![bitmap()],
            },
            store,
        );
    }

    fn open_ready(
        viewer: &mut Viewer,
        path: &str,
        page_count: i32,
        store: Option<&SessionStore>,
    ) {
        let job = viewer.open(path.to_string(), store);
        viewer.handle_event(
            Event::Opened {
                generation: job_generation(&job),
                page_count,
            },
            store,
        );
        complete(viewer, &job, store);
    }

    #[test]
    fn test_open_never_seen_uses_defaults() {
        let dir = tempdir().unwrap();
        let store = SessionStore::open(&dir.path().join("s.sqlite")).unwrap();
        let mut viewer = Viewer::new();

        let job = viewer.open("/docs/a.pdf".to_string(), Some(&store));
        match job {
            Job::Open {
                page,
                zoom,
                invert,
                ..
            } => {
                assert_eq!(page, 0);
                assert_eq!(zoom, 1.0);
                assert!(!invert);
            }
            _ => panic!("expected open job"),
        }
        assert_eq!(viewer.phase, Phase::Loading);
    }

    #[test]
    fn test_open_restores_saved_state() {
        let dir = tempdir().unwrap();
        let store = SessionStore::open(&dir.path().join("s.sqlite")).unwrap();
        store.upsert("/docs/a.pdf", 1.5, 4, true, 100).unwrap();

        let mut viewer = Viewer::new();
        let job = viewer.open("/docs/a.pdf".to_string(), Some(&store));
        match job {
            Job::Open {
                page,
                zoom,
                invert,
                ..
            } => {
                assert_eq!(page, 4);
                assert_eq!(zoom, 1.5);
                assert!(invert);
            }
            _ => panic!("expected open job"),
        }
        assert!(viewer.inverted);
        assert_eq!(viewer.current_page, 4);
    }

    #[test]
    fn test_navigate_is_noop_at_bounds() {
        let mut viewer = Viewer::new();
        open_ready(&mut viewer, "/docs/a.pdf", 3, None);

        assert!(viewer.navigate(-1).is_none());
        assert_eq!(viewer.current_page, 0);

        let job = viewer.navigate(1).unwrap();
        complete(&mut viewer, &job, None);
        let job = viewer.navigate(1).unwrap();
        complete(&mut viewer, &job, None);
        assert_eq!(viewer.current_page, 2);

        assert!(viewer.navigate(1).is_none());
        assert_eq!(viewer.current_page, 2);
        assert_eq!(viewer.phase, Phase::Ready);
    }

    #[test]
    fn test_navigate_with_no_document_is_noop() {
        let mut viewer = Viewer::new();
        assert!(viewer.navigate(1).is_none());
        assert!(viewer.navigate(-1).is_none());
    }

    #[test]
    fn test_spread_steps_two_pages() {
        let mut viewer = Viewer::new();
        open_ready(&mut viewer, "/docs/a.pdf", 10, None);

        let job = viewer.toggle_spread().unwrap();
        complete(&mut viewer, &job, None);
        assert!(viewer.two_page_spread);

        match viewer.navigate(1).unwrap() {
            Job::Render { page, spread, .. } => {
                assert_eq!(page, 2);
                assert!(spread);
            }
            _ => panic!("expected render job"),
        }
    }

    #[test]
    fn test_stale_render_is_discarded() {
        let mut viewer = Viewer::new();
        open_ready(&mut viewer, "/docs/a.pdf", 10, None);

        let first = viewer.navigate(1).unwrap();
        let second = viewer.navigate(1).unwrap();
        assert_ne!(job_generation(&first), job_generation(&second));

        // Late completion of the superseded request changes nothing.
        viewer.handle_event(
            Event::Rendered {
                generation: job_generation(&first),
                page: 1,
                pages: vec![bitmap()],
            },
            None,
        );
        assert_eq!(viewer.current_page, 0);
        assert_eq!(viewer.phase, Phase::Loading);

        complete(&mut viewer, &second, None);
        assert_eq!(viewer.current_page, 2);
        assert_eq!(viewer.phase, Phase::Ready);
    }

    #[test]
    fn test_set_zoom_clamps_and_rerenders() {
        let mut viewer = Viewer::new();
        open_ready(&mut viewer, "/docs/a.pdf", 10, None);

        let job = viewer.set_zoom(50.0).unwrap();
        assert_eq!(viewer.zoom, ZOOM_MAX);
        match job {
            Job::Render { page, zoom, .. } => {
                assert_eq!(page, 0);
                assert_eq!(zoom, ZOOM_MAX);
            }
            _ => panic!("expected render job"),
        }
    }

    #[test]
    fn test_toggles_without_document_issue_no_job() {
        let mut viewer = Viewer::new();
        assert!(viewer.toggle_invert().is_none());
        assert!(viewer.inverted);
        assert!(viewer.set_zoom(2.0).is_none());
        assert_eq!(viewer.zoom, 2.0);
    }

    #[test]
    fn test_open_failure_returns_to_empty() {
        let mut viewer = Viewer::new();
        let job = viewer.open("/docs/missing.pdf".to_string(), None);
        viewer.handle_event(
            Event::OpenFailed {
                generation: job_generation(&job),
                error: "no such file".to_string(),
            },
            None,
        );
        assert_eq!(viewer.phase, Phase::Empty);
        assert!(viewer.path.is_none());
        assert_eq!(viewer.last_error.as_deref(), Some("no such file"));
    }

    #[test]
    fn test_zoom_during_open_keeps_page_count() {
        let mut viewer = Viewer::new();
        let open = viewer.open("/docs/a.pdf".to_string(), None);

        // Wheel zoom lands before the worker reports the open.
        let zoom = viewer.set_zoom(2.0).unwrap();
        viewer.handle_event(
            Event::Opened {
                generation: job_generation(&open),
                page_count: 10,
            },
            None,
        );
        assert_eq!(viewer.page_count, 10);

        complete(&mut viewer, &zoom, None);
        assert_eq!(viewer.phase, Phase::Ready);
        assert!(viewer.navigate(1).is_some());
    }

    #[test]
    fn test_toggle_during_failed_open_still_returns_to_empty() {
        let mut viewer = Viewer::new();
        let open = viewer.open("/docs/missing.pdf".to_string(), None);
        let _ = viewer.toggle_invert();

        viewer.handle_event(
            Event::OpenFailed {
                generation: job_generation(&open),
                error: "no such file".to_string(),
            },
            None,
        );
        assert_eq!(viewer.phase, Phase::Empty);
        assert_eq!(viewer.last_error.as_deref(), Some("no such file"));
    }

    #[test]
    fn test_superseded_open_is_discarded() {
        let mut viewer = Viewer::new();
        let first = viewer.open("/docs/a.pdf".to_string(), None);
        let second = viewer.open("/docs/b.pdf".to_string(), None);

        viewer.handle_event(
            Event::Opened {
                generation: job_generation(&first),
                page_count: 99,
            },
            None,
        );
        assert_eq!(viewer.page_count, 0);

        viewer.handle_event(
            Event::Opened {
                generation: job_generation(&second),
                page_count: 10,
            },
            None,
        );
        assert_eq!(viewer.page_count, 10);
    }

    #[test]
    fn test_failed_rasterization_keeps_previous_page() {
        let mut viewer = Viewer::new();
        open_ready(&mut viewer, "/docs/a.pdf", 10, None);

        let job = viewer.navigate(1).unwrap();
        let displayed = viewer.handle_event(
            Event::Rendered {
                generation: job_generation(&job),
                page: 1,
                pages: Vec::new(),
            },
            None,
        );
        assert!(displayed.is_none());
        assert_eq!(viewer.current_page, 0);
        assert_eq!(viewer.phase, Phase::Ready);
    }

    #[test]
    fn test_parse_page_entry() {
        assert_eq!(parse_page_entry("3", 10), Some(2));
        assert_eq!(parse_page_entry(" 10 ", 10), Some(9));
        assert_eq!(parse_page_entry("0", 10), None);
        assert_eq!(parse_page_entry("11", 10), None);
        assert_eq!(parse_page_entry("abc", 10), None);
        assert_eq!(parse_page_entry("", 10), None);
        assert_eq!(parse_page_entry("1", 0), None);
    }

    #[test]
    fn test_parse_zoom_entry() {
        assert_eq!(parse_zoom_entry("150"), Some(1.5));
        assert_eq!(parse_zoom_entry("150%"), Some(1.5));
        assert_eq!(parse_zoom_entry(" 75 % "), Some(0.75));
        assert_eq!(parse_zoom_entry("-10"), None);
        assert_eq!(parse_zoom_entry("0"), None);
        assert_eq!(parse_zoom_entry("wide"), None);
    }

    #[test]
    fn test_worked_example_writes_through_to_store() {
        let dir = tempdir().unwrap();
        let store = SessionStore::open(&dir.path().join("s.sqlite")).unwrap();
        let mut viewer = Viewer::new();

        open_ready(&mut viewer, "a.pdf", 10, Some(&store));
        assert_eq!(viewer.current_page, 0);

        let job = viewer.navigate(1).unwrap();
        complete(&mut viewer, &job, Some(&store));
        assert_eq!(viewer.current_page, 1);

        let record = store.get("a.pdf").unwrap().unwrap();
        assert_eq!(record.page, 1);
        assert_eq!(record.zoom, 1.0);
        assert!(!record.inverted);

        for _ in 0..8 {
            let job = viewer.navigate(1).unwrap();
            complete(&mut viewer, &job, Some(&store));
        }
        assert_eq!(viewer.current_page, 9);

        // Last page: one more step is a no-op.
        assert!(viewer.navigate(1).is_none());
        assert_eq!(viewer.current_page, 9);
        assert_eq!(store.get("a.pdf").unwrap().unwrap().page, 9);
    }
}
