use bevy::log::{error, info, warn};
use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat};
use bevy::render::texture::Image;

use image::io::Reader as ImageReader;
use resvg::{tiny_skia, usvg};
use std::path::{Path, PathBuf};

use crate::stage::SpriteKind;

static CAT_SVG: &[u8] = include_bytes!("../../assets/sprites/cat.svg");
static DRAGON_SVG: &[u8] = include_bytes!("../../assets/sprites/dragon.svg");
static BEETLE_SVG: &[u8] = include_bytes!("../../assets/sprites/beetle.svg");
static CRAB_SVG: &[u8] = include_bytes!("../../assets/sprites/crab.svg");
static DOG_SVG: &[u8] = include_bytes!("../../assets/sprites/dog.svg");
pub static LOGO_SVG: &[u8] = include_bytes!("../../assets/logo.svg");

pub const SPRITE_TEXTURE_SIZE: u32 = 128;
pub const LOGO_TEXTURE_SIZE: u32 = 256;

fn embedded_svg(kind: SpriteKind) -> &'static [u8] {
    match kind {
        SpriteKind::Cat => CAT_SVG,
        SpriteKind::Dragon => DRAGON_SVG,
        SpriteKind::Beetle => BEETLE_SVG,
        SpriteKind::Crab => CRAB_SVG,
        SpriteKind::Dog => DOG_SVG,
    }
}

/// `<config_dir>/sprite-stage/sprites/<name>.png`, if the user dropped one in.
fn override_path(kind: SpriteKind) -> Option<PathBuf> {
    let mut path = dirs::config_dir()?;
    path.push("sprite-stage");
    path.push("sprites");
    path.push(format!("{}.png", kind.name().to_lowercase()));
    path.exists().then_some(path)
}

pub fn load_sprite_image(kind: SpriteKind) -> Image {
    if let Some(path) = override_path(kind) {
        match load_png(&path) {
            Some(img) => {
                info!("Using custom art for {} from {}", kind.name(), path.display());
                return img;
            }
            None => warn!("Could not decode {}, using built-in art", path.display()),
        }
    }
    load_svg_from_bytes(embedded_svg(kind), SPRITE_TEXTURE_SIZE).unwrap_or_else(|| {
        error!("Failed to render built-in art for {}", kind.name());
        placeholder()
    })
}

pub fn load_logo_image() -> Image {
    load_svg_from_bytes(LOGO_SVG, LOGO_TEXTURE_SIZE).unwrap_or_else(|| {
        error!("Failed to render logo");
        placeholder()
    })
}

fn placeholder() -> Image {
    Image::new_fill(
        Extent3d {
            width: 1,
            height: 1,
            depth_or_array_layers: 1,
        },
        TextureDimension::D2,
        &[255, 0, 255, 255],
        TextureFormat::Rgba8UnormSrgb,
    )
}

pub fn load_png(path: &Path) -> Option<Image> {
    let img = ImageReader::open(path).ok()?.decode().ok()?;
    let rgba_img = img.to_rgba8();
    let (width, height) = rgba_img.dimensions();
    Some(Image::new(
        Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        TextureDimension::D2,
        rgba_img.into_raw(),
        TextureFormat::Rgba8UnormSrgb,
    ))
}

pub fn load_svg_from_bytes(svg_bytes: &[u8], target_size: u32) -> Option<Image> {
    let opts = usvg::Options::default();
    let tree = match usvg::Tree::from_data(svg_bytes, &opts) {
        Ok(tree) => tree,
        Err(e) => {
            error!("Failed to parse SVG: {}", e);
            return None;
        }
    };

    let mut pixmap = tiny_skia::Pixmap::new(target_size, target_size)?;
    resvg::render(
        &tree,
        usvg::FitTo::Size(target_size, target_size),
        tiny_skia::Transform::default(),
        pixmap.as_mut(),
    )?;

    Some(Image::new(
        Extent3d {
            width: target_size,
            height: target_size,
            depth_or_array_layers: 1,
        },
        TextureDimension::D2,
        pixmap.take(),
        TextureFormat::Rgba8UnormSrgb,
    ))
}
