use std::sync::mpsc;
use std::thread;

/// A job for the render thread. Every job carries the generation counter
/// that was current when it was issued; replies echo it back so the control
/// thread can discard completions superseded by a newer request.
pub enum Job {
    /// Release the current document, open a new one, then render `page`.
    Open {
        generation: u64,
        path: String,
        page: i32,
        zoom: f64,
        invert: bool,
        spread: bool,
    },
    /// Render a page of the already-open document.
    Render {
        generation: u64,
        page: i32,
        zoom: f64,
        invert: bool,
        spread: bool,
    },
}

/// One rasterized page, RGBA with opaque alpha, ready for texture upload.
pub struct PageBitmap {
    pub width: u32,
    pub height: u32,
    pub samples: Vec<u8>,
}

pub enum Event {
    Opened {
        generation: u64,
        page_count: i32,
    },
    OpenFailed {
        generation: u64,
        error: String,
    },
    /// `page` is the rendered page index after clamping to the document;
    /// `pages` holds one bitmap, or two in spread mode.
    Rendered {
        generation: u64,
        page: i32,
        pages: Vec<PageBitmap>,
    },
}

/// The render thread owns the MuPDF document handle outright: opens and
/// rasterizations are serialized on it, so the handle can never be swapped
/// while a render is in flight.
pub struct RenderWorker {
    tx: mpsc::Sender<Job>,
    rx: mpsc::Receiver<Event>,
}

impl RenderWorker {
    pub fn spawn(oversample: f32) -> Self {
        let (req_tx, req_rx) = mpsc::channel::<Job>();
        let (res_tx, res_rx) = mpsc::channel::<Event>();

        thread::Builder::new()
            .name("render-worker".into())
            .spawn(move || {
                let mut doc: Option<mupdf::Document> = None;
                let mut page_count = 0;

                while let Ok(job) = req_rx.recv() {
                    match job {
                        Job::Open {
                            generation,
                            path,
                            page,
                            zoom,
                            invert,
                            spread,
                        } => {
                            // Drop the previous handle before opening the next.
                            doc = None;
                            match mupdf::Document::open(&path) {
                                Ok(d) => match d.page_count() {
                                    Ok(count) => {
                                        page_count = count;
                                        if res_tx
                                            .send(Event::Opened {
                                                generation,
                                                page_count,
                                            })
                                            .is_err()
                                        {
                                            break;
                                        }
                                        let rendered = render_job(
                                            &d, page_count, generation, page, zoom, invert,
                                            spread, oversample,
                                        );
                                        doc = Some(d);
                                        if res_tx.send(rendered).is_err() {
                                            break;
                                        }
                                    }
                                    Err(e) => {
                                        log::error!("Failed to read page count of {}: {}", path, e);
                                        if res_tx
                                            .send(Event::OpenFailed {
                                                generation,
                                                error: e.to_string(),
                                            })
                                            .is_err()
                                        {
                                            break;
                                        }
                                    }
                                },
                                Err(e) => {
                                    log::error!("Failed to open {}: {}", path, e);
                                    if res_tx
                                        .send(Event::OpenFailed {
                                            generation,
                                            error: e.to_string(),
                                        })
                                        .is_err()
                                    {
                                        break;
                                    }
                                }
                            }
                        }
                        Job::Render {
                            generation,
                            page,
                            zoom,
                            invert,
                            spread,
                        } => {
                            let Some(d) = &doc else {
                                log::warn!("Render request with no open document, dropping");
                                continue;
                            };
                            let rendered = render_job(
                                d, page_count, generation, page, zoom, invert, spread, oversample,
                            );
                            if res_tx.send(rendered).is_err() {
                                break;
                            }
                        }
                    }
                }
                log::info!("Render worker thread exiting");
            })
            .expect("Failed to spawn render worker thread");

        Self {
            tx: req_tx,
            rx: res_rx,
        }
    }

    /// Non-blocking submit. Returns false if the worker thread is gone.
    pub fn submit(&self, job: Job) -> bool {
        self.tx.send(job).is_ok()
    }

    /// Non-blocking poll for completed events.
    pub fn poll(&self) -> Option<Event> {
        self.rx.try_recv().ok()
    }
}

#[allow(clippy::too_many_arguments)]
fn render_job(
    doc: &mupdf::Document,
    page_count: i32,
    generation: u64,
    page: i32,
    zoom: f64,
    invert: bool,
    spread: bool,
    oversample: f32,
) -> Event {
    let page = page.clamp(0, (page_count - 1).max(0));
    let scale = zoom as f32 * oversample;

    let mut targets = vec![page];
    if spread && page + 1 < page_count {
        targets.push(page + 1);
    }

    let mut pages = Vec::with_capacity(targets.len());
    for target in targets {
        match crate::rasterize_page(doc, target, scale) {
            Ok((mut rgb, width, height)) => {
                if invert {
                    invert_samples(&mut rgb);
                }
                pages.push(PageBitmap {
                    width,
                    height,
                    samples: rgb_to_rgba(&rgb),
                });
            }
            Err(e) => {
                log::error!("Failed to rasterize page {}: {}", target + 1, e);
            }
        }
    }

    Event::Rendered {
        generation,
        page,
        pages,
    }
}

/// Invert every RGB component in place.
fn invert_samples(samples: &mut [u8]) {
    for b in samples.iter_mut() {
        *b = 255 - *b;
    }
}

/// Expand packed RGB to RGBA with opaque alpha. Skia raster images have no
/// 24-bit colour type, so the expansion happens here, off the control thread.
fn rgb_to_rgba(rgb: &[u8]) -> Vec<u8> {
    let mut rgba = vec![255u8; rgb.len() / 3 * 4];
    for (dst, src) in rgba.chunks_exact_mut(4).zip(rgb.chunks_exact(3)) {
        dst[..3].copy_from_slice(src);
    }
    rgba
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invert_samples() {
        let mut samples = vec![0u8, 255, 128, 10];
        invert_samples(&mut samples);
        assert_eq!(samples, vec![255, 0, 127, 245]);
    }

    #[test]
    fn test_rgb_to_rgba() {
        let rgb = vec![1u8, 2, 3, 4, 5, 6];
        let rgba = rgb_to_rgba(&rgb);
        assert_eq!(rgba, vec![1, 2, 3, 255, 4, 5, 6, 255]);
    }
}
