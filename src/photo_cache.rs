// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Plane photo texture cache and background loading.
//!
//! Manages async loading of plane photos from URLs or local paths,
//! conversion to egui textures, and disk caching with SHA256-based
//! filenames. In-flight loads are de-duplicated per reference, capped at a
//! fixed concurrency, and carry a liveness token checked at the single
//! point a result is applied: a load finishing after its grid was torn
//! down discards the result.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use log::{debug, warn};
use sha2::{Digest, Sha256};
use tokio_util::sync::CancellationToken;

/// Timeout for a single photo download.
const FETCH_TIMEOUT: Duration = Duration::from_secs(4);

/// Maximum photo loads running at once; further requests wait for the next
/// frame to find a free slot.
const MAX_CONCURRENT_LOADS: usize = 8;

/// Thumbnail bounds used for card textures.
const THUMBNAIL_WIDTH: u32 = 320;
const THUMBNAIL_HEIGHT: u32 = 200;

/// Photo byte cache backed by the user cache directory.
#[derive(Debug, Clone)]
pub struct PhotoCache {
    cache_dir: PathBuf,
    http: reqwest::Client,
}

impl PhotoCache {
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let cache_dir = dirs::cache_dir()
            .ok_or("Could not determine cache directory")?
            .join("flysmart-desktop")
            .join("plane_photos");

        fs::create_dir_all(&cache_dir)?;

        let http = reqwest::Client::builder().timeout(FETCH_TIMEOUT).build()?;

        Ok(Self { cache_dir, http })
    }

    /// Cache file path for a given reference.
    fn cache_path(&self, image_ref: &str) -> PathBuf {
        // SHA256 hash of the reference as filename to avoid filesystem issues
        let mut hasher = Sha256::new();
        hasher.update(image_ref.as_bytes());
        let hash = format!("{:x}", hasher.finalize());

        self.cache_dir.join(format!("{hash}.img"))
    }

    /// Get cached image bytes for a remote reference.
    pub fn cached_bytes(&self, image_ref: &str) -> Option<Vec<u8>> {
        fs::read(self.cache_path(image_ref)).ok()
    }

    /// Fetch the raw bytes for a reference: HTTP(S) references are
    /// downloaded and cached to disk, anything else is read as a local
    /// file path.
    pub async fn fetch(
        &self,
        image_ref: &str,
    ) -> Result<Vec<u8>, Box<dyn std::error::Error + Send + Sync>> {
        if is_remote(image_ref) {
            let response = self.http.get(image_ref).send().await?;
            if !response.status().is_success() {
                return Err(format!("HTTP error: {}", response.status()).into());
            }
            let bytes = response.bytes().await?.to_vec();

            if let Err(e) = fs::write(self.cache_path(image_ref), &bytes) {
                warn!("failed to write photo cache: {e}");
            }
            Ok(bytes)
        } else {
            Ok(fs::read(image_ref)?)
        }
    }
}

/// Whether a reference points at the network rather than the local disk.
fn is_remote(image_ref: &str) -> bool {
    image_ref.starts_with("http://") || image_ref.starts_with("https://")
}

/// Display state of one photo reference.
#[derive(Clone)]
pub enum PhotoState {
    /// A background load is running.
    Loading,
    /// Decoded and ready to draw.
    Loaded(egui::TextureHandle),
    /// Fetch or decode failed; show the fallback icon.
    Failed,
}

impl std::fmt::Debug for PhotoState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Loading => write!(f, "Loading"),
            Self::Loaded(_) => write!(f, "Loaded"),
            Self::Failed => write!(f, "Failed"),
        }
    }
}

/// Manages loading plane photos into egui textures.
pub struct PhotoTextureManager {
    cache: PhotoCache,
    photos: Arc<Mutex<HashMap<String, PhotoState>>>,
    placeholder: Option<egui::TextureHandle>,
}

impl std::fmt::Debug for PhotoTextureManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhotoTextureManager")
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

impl PhotoTextureManager {
    pub fn new() -> Self {
        Self {
            cache: PhotoCache::new().expect("Failed to create photo cache"),
            photos: Arc::new(Mutex::new(HashMap::new())),
            placeholder: None,
        }
    }

    /// Initialize placeholder texture (call once during UI setup).
    pub fn init_placeholder(&mut self, ctx: &egui::Context) {
        // Light card background with a simple plane silhouette
        let width = 96;
        let height = 60;
        let mut pixels = vec![egui::Color32::from_rgb(234, 245, 250); width * height];

        let body = egui::Color32::from_rgb(165, 195, 212);
        // Fuselage
        for y in 26..34 {
            for x in 24..72 {
                pixels[y * width + x] = body;
            }
        }
        // Wings
        for x in 40..56 {
            for y in 12..48 {
                pixels[y * width + x] = body;
            }
        }
        // Tail
        for y in 18..28 {
            for x in 24..30 {
                pixels[y * width + x] = body;
            }
        }

        let image = egui::ColorImage {
            size: [width, height],
            pixels,
            source_size: egui::Vec2::new(width as f32, height as f32),
        };

        self.placeholder = Some(ctx.load_texture(
            "plane_placeholder",
            image,
            egui::TextureOptions::LINEAR,
        ));
    }

    /// Get placeholder texture.
    pub fn placeholder(&self) -> Option<&egui::TextureHandle> {
        self.placeholder.as_ref()
    }

    /// Pure lookup; never starts a fetch.
    pub fn get(&self, image_ref: &str) -> Option<PhotoState> {
        self.photos.lock().unwrap().get(image_ref).cloned()
    }

    /// Ensure a load is running for `image_ref`.
    ///
    /// No-op when the photo is already loaded, loading, or failed. Consults
    /// the disk cache before spawning a download. `liveness` belongs to the
    /// requesting grid; once it is cancelled a completing load discards its
    /// result instead of touching shared state.
    pub fn request(&self, ctx: &egui::Context, image_ref: &str, liveness: &CancellationToken) {
        {
            let mut photos = self.photos.lock().unwrap();
            if photos.contains_key(image_ref) {
                return;
            }

            // Disk cache hits decode synchronously; only misses go async.
            if is_remote(image_ref) {
                if let Some(bytes) = self.cache.cached_bytes(image_ref) {
                    let state = match texture_from_bytes(ctx, &bytes, image_ref) {
                        Some(texture) => PhotoState::Loaded(texture),
                        None => PhotoState::Failed,
                    };
                    photos.insert(image_ref.to_string(), state);
                    return;
                }
            }

            let in_flight = photos
                .values()
                .filter(|s| matches!(s, PhotoState::Loading))
                .count();
            if in_flight >= MAX_CONCURRENT_LOADS {
                // Slot found on a later frame
                return;
            }

            photos.insert(image_ref.to_string(), PhotoState::Loading);
        }

        let cache = self.cache.clone();
        let photos = self.photos.clone();
        let ctx = ctx.clone();
        let image_ref = image_ref.to_string();
        let liveness = liveness.clone();

        std::thread::spawn(move || {
            let rt = tokio::runtime::Runtime::new().unwrap();
            let result = rt.block_on(cache.fetch(&image_ref));
            apply_load_result(&photos, &ctx, &image_ref, result, liveness.is_cancelled());
        });
    }

    /// Number of loads currently in flight.
    #[allow(dead_code)]
    pub fn loading_count(&self) -> usize {
        self.photos
            .lock()
            .unwrap()
            .values()
            .filter(|s| matches!(s, PhotoState::Loading))
            .count()
    }
}

impl Default for PhotoTextureManager {
    fn default() -> Self {
        Self::new()
    }
}

/// The single point a finished load touches shared state.
///
/// A cancelled load clears its marker and drops the bytes so a later grid
/// can restart the fetch.
fn apply_load_result(
    photos: &Mutex<HashMap<String, PhotoState>>,
    ctx: &egui::Context,
    image_ref: &str,
    result: Result<Vec<u8>, Box<dyn std::error::Error + Send + Sync>>,
    cancelled: bool,
) {
    if cancelled {
        debug!("discarding photo load for destroyed view: {image_ref}");
        photos.lock().unwrap().remove(image_ref);
        return;
    }

    let state = match result {
        Ok(bytes) => match texture_from_bytes(ctx, &bytes, image_ref) {
            Some(texture) => PhotoState::Loaded(texture),
            None => PhotoState::Failed,
        },
        Err(e) => {
            debug!("photo load failed for {image_ref}: {e}");
            PhotoState::Failed
        }
    };

    photos.lock().unwrap().insert(image_ref.to_string(), state);
    ctx.request_repaint();
}

fn texture_from_bytes(ctx: &egui::Context, bytes: &[u8], image_ref: &str) -> Option<egui::TextureHandle> {
    // Load image using the image crate
    let image = image::load_from_memory(bytes).ok()?;

    // Track original size
    let source_size = [image.width() as usize, image.height() as usize];

    // Resize to card thumbnail bounds
    let thumbnail = image.resize(
        THUMBNAIL_WIDTH,
        THUMBNAIL_HEIGHT,
        image::imageops::FilterType::Lanczos3,
    );
    let rgba = thumbnail.to_rgba8();

    let size = [rgba.width() as usize, rgba.height() as usize];
    let pixels: Vec<egui::Color32> = rgba
        .pixels()
        .map(|p| egui::Color32::from_rgba_premultiplied(p[0], p[1], p[2], p[3]))
        .collect();

    let color_image = egui::ColorImage {
        size,
        pixels,
        source_size: egui::Vec2::new(source_size[0] as f32, source_size[1] as f32),
    };

    Some(ctx.load_texture(
        format!("plane_photo_{image_ref}"),
        color_image,
        egui::TextureOptions::LINEAR,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_detection() {
        assert!(is_remote("https://example.com/a320.jpg"));
        assert!(is_remote("http://example.com/a320.jpg"));
        assert!(!is_remote("/home/user/planes/a320.jpg"));
        assert!(!is_remote("C:\\planes\\a320.jpg"));
        assert!(!is_remote("httpdocs/a320.jpg"));
    }

    #[test]
    fn test_stored_texture_round_trip() {
        let ctx = egui::Context::default();
        let photos = Mutex::new(HashMap::new());

        let mut bytes: Vec<u8> = Vec::new();
        let img = image::RgbaImage::from_pixel(4, 4, image::Rgba([10, 20, 30, 255]));
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();

        apply_load_result(&photos, &ctx, "ref", Ok(bytes), false);

        assert!(matches!(
            photos.lock().unwrap().get("ref"),
            Some(PhotoState::Loaded(_))
        ));
        // Absent keys stay absent; lookups never start a fetch.
        assert!(photos.lock().unwrap().get("other").is_none());
    }

    #[test]
    fn test_cancelled_load_discards_result() {
        let ctx = egui::Context::default();
        let photos = Mutex::new(HashMap::new());
        photos
            .lock()
            .unwrap()
            .insert("ref".to_string(), PhotoState::Loading);

        apply_load_result(&photos, &ctx, "ref", Ok(vec![1, 2, 3]), true);

        // The marker is cleared, not promoted to Loaded/Failed.
        assert!(photos.lock().unwrap().get("ref").is_none());
    }

    #[test]
    fn test_failed_fetch_marks_fallback() {
        let ctx = egui::Context::default();
        let photos = Mutex::new(HashMap::new());

        apply_load_result(&photos, &ctx, "ref", Err("timeout".into()), false);

        assert!(matches!(
            photos.lock().unwrap().get("ref"),
            Some(PhotoState::Failed)
        ));
    }

    #[test]
    fn test_undecodable_bytes_mark_fallback() {
        let ctx = egui::Context::default();
        let photos = Mutex::new(HashMap::new());

        apply_load_result(&photos, &ctx, "ref", Ok(b"not an image".to_vec()), false);

        assert!(matches!(
            photos.lock().unwrap().get("ref"),
            Some(PhotoState::Failed)
        ));
    }
}
