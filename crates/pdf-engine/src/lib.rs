mod paint;

use image::{ImageBuffer, Rgba};
use lopdf::{Document, ObjectId};
use paint::Transform;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

pub type RgbaImage = ImageBuffer<Rgba<u8>, Vec<u8>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocumentHandle(u64);

impl DocumentHandle {
    pub fn raw(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width_pt: f32,
    pub height_pt: f32,
}

/// One page rasterization: page index plus the horizontal and vertical
/// scale of the page transform (1.0 = 72 dpi).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderRequest {
    pub page_index: u32,
    pub scale_x: f32,
    pub scale_y: f32,
}

impl RenderRequest {
    pub fn uniform(page_index: u32, scale: f32) -> Self {
        Self { page_index, scale_x: scale, scale_y: scale }
    }
}

impl Default for RenderRequest {
    fn default() -> Self {
        Self::uniform(0, 1.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    Rgb8,
    Rgba8,
    Bgra8,
}

impl PixelFormat {
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Rgb8 => 3,
            Self::Rgba8 | Self::Bgra8 => 4,
        }
    }
}

/// Pixels produced by an engine. Rows are `stride` bytes apart and may carry
/// padding after the last pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterBuffer {
    pub width: u32,
    pub height: u32,
    pub stride: usize,
    pub format: PixelFormat,
    pub samples: Vec<u8>,
}

impl RasterBuffer {
    pub fn from_rgba_image(image: RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            width,
            height,
            stride: width as usize * PixelFormat::Rgba8.bytes_per_pixel(),
            format: PixelFormat::Rgba8,
            samples: image.into_raw(),
        }
    }

    /// Tightly packed RGBA8 pixels, whatever the source format and stride.
    /// Rows missing from a short sample buffer come out transparent.
    pub fn to_rgba8(&self) -> Vec<u8> {
        let bpp = self.format.bytes_per_pixel();
        let row_len = self.width as usize * bpp;
        let mut out = vec![0_u8; self.width as usize * self.height as usize * 4];
        if out.is_empty() {
            return out;
        }

        for (y, dst_row) in out.chunks_exact_mut(self.width as usize * 4).enumerate() {
            let start = y * self.stride;
            let Some(src_row) = self.samples.get(start..start + row_len) else {
                break;
            };

            for (src, dst) in src_row.chunks_exact(bpp).zip(dst_row.chunks_exact_mut(4)) {
                let pixel = match self.format {
                    PixelFormat::Rgb8 => [src[0], src[1], src[2], 255],
                    PixelFormat::Rgba8 => [src[0], src[1], src[2], src[3]],
                    PixelFormat::Bgra8 => [src[2], src[1], src[0], src[3]],
                };
                dst.copy_from_slice(&pixel);
            }
        }

        out
    }
}

#[derive(Debug, Clone)]
pub enum OpenSource {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

impl From<PathBuf> for OpenSource {
    fn from(value: PathBuf) -> Self {
        Self::Path(value)
    }
}

impl From<&Path> for OpenSource {
    fn from(value: &Path) -> Self {
        Self::Path(value.to_path_buf())
    }
}

impl From<Vec<u8>> for OpenSource {
    fn from(value: Vec<u8>) -> Self {
        Self::Bytes(value)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PdfEngineError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("PDF parse error: {0}")]
    Parse(#[from] lopdf::Error),
    #[error("invalid handle {0}")]
    InvalidHandle(u64),
    #[error("page {page} out of range (page_count={page_count})")]
    PageOutOfRange { page: u32, page_count: u32 },
    #[error("encrypted PDFs are not supported in the default backend")]
    EncryptedUnsupported,
    #[error("backend error: {0}")]
    Backend(String),
}

pub trait PdfEngine {
    fn open(&mut self, source: OpenSource) -> Result<DocumentHandle, PdfEngineError>;
    fn page_count(&self, handle: DocumentHandle) -> Result<u32, PdfEngineError>;
    fn page_size(
        &self,
        handle: DocumentHandle,
        page_index: u32,
    ) -> Result<PageSize, PdfEngineError>;
    fn rasterize(
        &self,
        handle: DocumentHandle,
        request: RenderRequest,
    ) -> Result<RasterBuffer, PdfEngineError>;
    fn close(&mut self, handle: DocumentHandle) -> Result<(), PdfEngineError>;
}

impl<T: PdfEngine + ?Sized> PdfEngine for Box<T> {
    fn open(&mut self, source: OpenSource) -> Result<DocumentHandle, PdfEngineError> {
        (**self).open(source)
    }

    fn page_count(&self, handle: DocumentHandle) -> Result<u32, PdfEngineError> {
        (**self).page_count(handle)
    }

    fn page_size(
        &self,
        handle: DocumentHandle,
        page_index: u32,
    ) -> Result<PageSize, PdfEngineError> {
        (**self).page_size(handle, page_index)
    }

    fn rasterize(
        &self,
        handle: DocumentHandle,
        request: RenderRequest,
    ) -> Result<RasterBuffer, PdfEngineError> {
        (**self).rasterize(handle, request)
    }

    fn close(&mut self, handle: DocumentHandle) -> Result<(), PdfEngineError> {
        (**self).close(handle)
    }
}

#[derive(Debug, Clone, Copy)]
struct PageRecord {
    id: ObjectId,
    size: PageSize,
    origin: (f32, f32),
}

#[derive(Debug)]
struct DocumentRecord {
    document: Document,
    pages: Vec<PageRecord>,
}

impl DocumentRecord {
    fn page(&self, page_index: u32) -> Result<&PageRecord, PdfEngineError> {
        self.pages.get(page_index as usize).ok_or(PdfEngineError::PageOutOfRange {
            page: page_index,
            page_count: self.pages.len() as u32,
        })
    }
}

/// Pure Rust backend. Reads the page tree and media boxes, and paints the
/// vector paths of each page's content stream in solid colours.
#[derive(Debug, Default)]
pub struct LopdfEngine {
    next_handle: u64,
    docs: HashMap<DocumentHandle, DocumentRecord>,
}

impl LopdfEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open_count(&self) -> usize {
        self.docs.len()
    }

    fn parse(bytes: &[u8]) -> Result<DocumentRecord, PdfEngineError> {
        if bytes.windows("/Encrypt".len()).any(|window| window == b"/Encrypt") {
            return Err(PdfEngineError::EncryptedUnsupported);
        }

        let document = Document::load_mem(bytes)?;
        let mut pages = Vec::new();

        for (_, id) in document.get_pages() {
            let dict = document.get_dictionary(id)?;
            let media_box = dict
                .get(b"MediaBox")
                .ok()
                .and_then(|obj| obj.as_array().ok())
                .and_then(|array| {
                    if array.len() != 4 {
                        return None;
                    }
                    let x0 = array[0].as_float().ok()?;
                    let y0 = array[1].as_float().ok()?;
                    let x1 = array[2].as_float().ok()?;
                    let y1 = array[3].as_float().ok()?;
                    Some([x0, y0, x1, y1])
                })
                .unwrap_or([0.0, 0.0, 612.0, 792.0]);

            let [x0, y0, x1, y1] = media_box;
            pages.push(PageRecord {
                id,
                size: PageSize { width_pt: (x1 - x0).abs(), height_pt: (y1 - y0).abs() },
                origin: (x0.min(x1), y0.min(y1)),
            });
        }

        if pages.is_empty() {
            return Err(PdfEngineError::Backend("document has no pages".to_owned()));
        }

        Ok(DocumentRecord { document, pages })
    }

    fn record(&self, handle: DocumentHandle) -> Result<&DocumentRecord, PdfEngineError> {
        self.docs.get(&handle).ok_or(PdfEngineError::InvalidHandle(handle.raw()))
    }
}

impl PdfEngine for LopdfEngine {
    fn open(&mut self, source: OpenSource) -> Result<DocumentHandle, PdfEngineError> {
        let bytes = match source {
            OpenSource::Path(path) => fs::read(path)?,
            OpenSource::Bytes(bytes) => bytes,
        };

        let record = Self::parse(&bytes)?;

        self.next_handle += 1;
        let handle = DocumentHandle(self.next_handle);
        log::debug!("lopdf: opened handle {} with {} pages", handle.raw(), record.pages.len());
        self.docs.insert(handle, record);

        Ok(handle)
    }

    fn page_count(&self, handle: DocumentHandle) -> Result<u32, PdfEngineError> {
        Ok(self.record(handle)?.pages.len() as u32)
    }

    fn page_size(
        &self,
        handle: DocumentHandle,
        page_index: u32,
    ) -> Result<PageSize, PdfEngineError> {
        Ok(self.record(handle)?.page(page_index)?.size)
    }

    fn rasterize(
        &self,
        handle: DocumentHandle,
        request: RenderRequest,
    ) -> Result<RasterBuffer, PdfEngineError> {
        let record = self.record(handle)?;
        let page = record.page(request.page_index)?;
        let scale_x = if request.scale_x <= 0.0 { 1.0 } else { request.scale_x };
        let scale_y = if request.scale_y <= 0.0 { 1.0 } else { request.scale_y };

        let width = (page.size.width_pt * scale_x).round().max(1.0) as u32;
        let height = (page.size.height_pt * scale_y).round().max(1.0) as u32;

        let mut image = RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255]));
        let content = record.document.get_page_content(page.id)?;
        let to_raster =
            Transform::page_to_raster(page.origin, page.size.height_pt, scale_x, scale_y);
        paint::paint_content(&mut image, &content, to_raster)?;

        Ok(RasterBuffer::from_rgba_image(image))
    }

    fn close(&mut self, handle: DocumentHandle) -> Result<(), PdfEngineError> {
        log::debug!("lopdf: closing handle {}", handle.raw());
        self.docs.remove(&handle).map(|_| ()).ok_or(PdfEngineError::InvalidHandle(handle.raw()))
    }
}

#[cfg(feature = "pdfium")]
pub mod pdfium_backend {
    use super::*;
    use pdfium_render::prelude::*;

    /// Full renderer on top of the PDFium shared library.
    pub struct PdfiumEngine {
        pdfium: &'static Pdfium,
        next_handle: u64,
        docs: HashMap<DocumentHandle, PdfDocument<'static>>,
    }

    impl PdfiumEngine {
        /// Binds PDFium from the executable directory, the working directory,
        /// then the system library path.
        pub fn from_system_library() -> Result<Self, PdfEngineError> {
            let exe_dir = std::env::current_exe()
                .ok()
                .and_then(|path| path.parent().map(Path::to_path_buf));

            let bindings = exe_dir
                .and_then(|dir| {
                    Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(&dir))
                        .ok()
                })
                .map(Ok)
                .unwrap_or_else(|| {
                    Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
                        .or_else(|_| Pdfium::bind_to_system_library())
                })
                .map_err(|err| {
                    PdfEngineError::Backend(format!("failed to bind pdfium library: {err}"))
                })?;

            let pdfium: &'static Pdfium = Box::leak(Box::new(Pdfium::new(bindings)));

            Ok(Self { pdfium, next_handle: 0, docs: HashMap::new() })
        }

        fn document(&self, handle: DocumentHandle) -> Result<&PdfDocument<'static>, PdfEngineError> {
            self.docs.get(&handle).ok_or(PdfEngineError::InvalidHandle(handle.raw()))
        }

        fn page(
            &self,
            handle: DocumentHandle,
            page_index: u32,
        ) -> Result<PdfPage<'_>, PdfEngineError> {
            let document = self.document(handle)?;
            let pages = document.pages();
            let page_count = pages.len() as u32;
            let out_of_range = || PdfEngineError::PageOutOfRange { page: page_index, page_count };

            if page_index >= page_count {
                return Err(out_of_range());
            }

            let index = page_index.try_into().map_err(|_| out_of_range())?;
            pages.get(index).map_err(|_| out_of_range())
        }
    }

    impl PdfEngine for PdfiumEngine {
        fn open(&mut self, source: OpenSource) -> Result<DocumentHandle, PdfEngineError> {
            let document = match source {
                OpenSource::Path(path) => self.pdfium.load_pdf_from_file(&path, None),
                OpenSource::Bytes(bytes) => self.pdfium.load_pdf_from_byte_vec(bytes, None),
            }
            .map_err(|err| PdfEngineError::Backend(err.to_string()))?;

            self.next_handle += 1;
            let handle = DocumentHandle(self.next_handle);
            self.docs.insert(handle, document);

            Ok(handle)
        }

        fn page_count(&self, handle: DocumentHandle) -> Result<u32, PdfEngineError> {
            Ok(self.document(handle)?.pages().len() as u32)
        }

        fn page_size(
            &self,
            handle: DocumentHandle,
            page_index: u32,
        ) -> Result<PageSize, PdfEngineError> {
            let page = self.page(handle, page_index)?;
            Ok(PageSize { width_pt: page.width().value, height_pt: page.height().value })
        }

        fn rasterize(
            &self,
            handle: DocumentHandle,
            request: RenderRequest,
        ) -> Result<RasterBuffer, PdfEngineError> {
            let page = self.page(handle, request.page_index)?;
            let width = (page.width().value * request.scale_x).round().max(1.0);
            let height = (page.height().value * request.scale_y).round().max(1.0);

            let config = PdfRenderConfig::new()
                .set_target_width(width as i32)
                .set_target_height(height as i32);

            let bitmap = page
                .render_with_config(&config)
                .map_err(|err| PdfEngineError::Backend(err.to_string()))?;

            let width = bitmap.width() as u32;
            let height = bitmap.height() as u32;

            Ok(RasterBuffer {
                width,
                height,
                stride: width as usize * PixelFormat::Rgba8.bytes_per_pixel(),
                format: PixelFormat::Rgba8,
                samples: bitmap.as_rgba_bytes().to_vec(),
            })
        }

        fn close(&mut self, handle: DocumentHandle) -> Result<(), PdfEngineError> {
            self.docs.remove(&handle).map(|_| ()).ok_or(PdfEngineError::InvalidHandle(handle.raw()))
        }
    }
}

pub fn default_engine() -> LopdfEngine {
    LopdfEngine::new()
}

/// The best engine this build can offer: PDFium when the `pdfium` feature is
/// on and the library binds, the lopdf backend otherwise.
pub fn best_available_engine() -> Box<dyn PdfEngine> {
    pdfium_engine().unwrap_or_else(|| Box::new(default_engine()))
}

#[cfg(feature = "pdfium")]
fn pdfium_engine() -> Option<Box<dyn PdfEngine>> {
    match pdfium_backend::PdfiumEngine::from_system_library() {
        Ok(engine) => Some(Box::new(engine)),
        Err(err) => {
            log::warn!("{err}; falling back to the lopdf backend");
            None
        }
    }
}

#[cfg(not(feature = "pdfium"))]
fn pdfium_engine() -> Option<Box<dyn PdfEngine>> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture(name: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../tests/fixtures").join(name)
    }

    fn sample_pdf_bytes() -> &'static [u8] {
        include_bytes!("../../../tests/fixtures/small.pdf")
    }

    #[test]
    fn opens_pdf_and_reads_page_count() {
        let mut engine = LopdfEngine::new();
        let handle = engine
            .open(OpenSource::Bytes(sample_pdf_bytes().to_vec()))
            .expect("open should succeed");

        assert_eq!(engine.page_count(handle).expect("count should succeed"), 1);
    }

    #[test]
    fn reads_media_box_per_page() {
        let mut engine = LopdfEngine::new();
        let handle =
            engine.open(OpenSource::from(fixture("three-pages.pdf"))).expect("open should succeed");

        assert_eq!(engine.page_count(handle).unwrap(), 3);
        assert_eq!(
            engine.page_size(handle, 2).unwrap(),
            PageSize { width_pt: 200.0, height_pt: 100.0 }
        );

        let err = engine.page_size(handle, 3).expect_err("page 3 does not exist");
        assert!(matches!(err, PdfEngineError::PageOutOfRange { page: 3, page_count: 3 }));
    }

    #[test]
    fn rasterize_applies_scale_per_axis() {
        let mut engine = LopdfEngine::new();
        let handle =
            engine.open(OpenSource::from(fixture("three-pages.pdf"))).expect("open should succeed");

        let raster = engine
            .rasterize(handle, RenderRequest { page_index: 2, scale_x: 1.5, scale_y: 0.5 })
            .expect("rasterize should succeed");

        assert_eq!((raster.width, raster.height), (300, 50));
        assert_eq!(raster.format, PixelFormat::Rgba8);
        assert_eq!(raster.stride, 300 * 4);
        assert_eq!(raster.samples.len(), 300 * 50 * 4);
    }

    #[test]
    fn rasterize_paints_page_content() {
        let mut engine = LopdfEngine::new();
        let handle =
            engine.open(OpenSource::from(fixture("filled-rect.pdf"))).expect("open should succeed");

        let raster = engine.rasterize(handle, RenderRequest::uniform(0, 2.0)).unwrap();
        let pixels = RgbaImage::from_raw(raster.width, raster.height, raster.to_rgba8()).unwrap();

        assert_eq!((raster.width, raster.height), (400, 200));
        assert_eq!(pixels.get_pixel(200, 100), &Rgba([0, 0, 0, 255]));
        assert_eq!(pixels.get_pixel(200, 10), &Rgba([255, 0, 0, 255]));
        assert_eq!(pixels.get_pixel(5, 100), &Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn page_without_content_stays_white() {
        let mut engine = LopdfEngine::new();
        let handle = engine
            .open(OpenSource::Bytes(sample_pdf_bytes().to_vec()))
            .expect("open should succeed");

        let raster = engine.rasterize(handle, RenderRequest::uniform(0, 0.25)).unwrap();
        assert!(raster.to_rgba8().iter().all(|&channel| channel == 255));
    }

    #[test]
    fn invalid_handle_returns_error() {
        let engine = LopdfEngine::new();
        let err =
            engine.page_count(DocumentHandle(999)).expect_err("should fail for unknown handle");

        assert!(matches!(err, PdfEngineError::InvalidHandle(999)));
    }

    #[test]
    fn close_releases_document() {
        let mut engine = LopdfEngine::new();
        let handle = engine
            .open(OpenSource::Bytes(sample_pdf_bytes().to_vec()))
            .expect("open should succeed");
        assert_eq!(engine.open_count(), 1);

        engine.close(handle).expect("close should succeed");
        assert_eq!(engine.open_count(), 0);
        assert!(matches!(engine.close(handle), Err(PdfEngineError::InvalidHandle(_))));
    }

    #[test]
    fn rejects_garbage_and_encrypted_files() {
        let mut engine = LopdfEngine::new();

        assert!(engine.open(OpenSource::from(fixture("invalid.pdf"))).is_err());
        assert!(matches!(
            engine.open(OpenSource::from(fixture("encrypted-marker.pdf"))),
            Err(PdfEngineError::EncryptedUnsupported)
        ));
        assert!(matches!(
            engine.open(OpenSource::from(fixture("missing.pdf"))),
            Err(PdfEngineError::Io(_))
        ));
        assert_eq!(engine.open_count(), 0);
    }

    #[test]
    fn boxed_engine_delegates() {
        let mut engine: Box<dyn PdfEngine> = Box::new(LopdfEngine::new());
        let handle =
            engine.open(OpenSource::from(fixture("three-pages.pdf"))).expect("open should succeed");

        assert_eq!(engine.page_count(handle).unwrap(), 3);
        engine.close(handle).expect("close should succeed");
        assert!(engine.page_count(handle).is_err());
    }

    #[test]
    fn rgb_raster_with_padded_stride_unpacks_to_rgba() {
        let raster = RasterBuffer {
            width: 2,
            height: 2,
            stride: 8,
            format: PixelFormat::Rgb8,
            samples: vec![
                1, 2, 3, 4, 5, 6, 0, 0, //
                7, 8, 9, 10, 11, 12, 0, 0,
            ],
        };

        assert_eq!(
            raster.to_rgba8(),
            vec![1, 2, 3, 255, 4, 5, 6, 255, 7, 8, 9, 255, 10, 11, 12, 255]
        );
    }

    #[test]
    fn bgra_raster_swaps_channels() {
        let raster = RasterBuffer {
            width: 1,
            height: 1,
            stride: 4,
            format: PixelFormat::Bgra8,
            samples: vec![10, 20, 30, 40],
        };

        assert_eq!(raster.to_rgba8(), vec![30, 20, 10, 40]);
    }
}
