// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Flash image persistence.
//!
//! Images are stored as a postcard-encoded record behind a short magic and
//! a format version.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::model::FlashImage;

const IMAGE_MAGIC: [u8; 4] = *b"ONDI";
const IMAGE_VERSION: u16 = 1;

#[derive(Serialize)]
struct ImageFileRef<'a> {
    magic: [u8; 4],
    version: u16,
    image: &'a FlashImage,
}

#[derive(Deserialize)]
struct ImageFile {
    magic: [u8; 4],
    version: u16,
    image: FlashImage,
}

pub fn encode(image: &FlashImage) -> Result<Vec<u8>> {
    let file = ImageFileRef {
        magic: IMAGE_MAGIC,
        version: IMAGE_VERSION,
        image,
    };
    postcard::to_stdvec(&file).map_err(|e| anyhow::anyhow!("Failed to serialize image: {}", e))
}

pub fn decode(bytes: &[u8]) -> Result<FlashImage> {
    let file: ImageFile = postcard::from_bytes(bytes)
        .map_err(|e| anyhow::anyhow!("Failed to deserialize image: {}", e))?;
    if file.magic != IMAGE_MAGIC {
        bail!("Not a flash image (bad magic)");
    }
    if file.version != IMAGE_VERSION {
        bail!("Unsupported image version {}", file.version);
    }
    Ok(file.image)
}

pub fn load(path: &Path) -> Result<FlashImage> {
    let bytes = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    decode(&bytes).with_context(|| format!("Failed to load {}", path.display()))
}

pub fn save(path: &Path, image: &FlashImage) -> Result<()> {
    let bytes = encode(image)?;
    fs::write(path, bytes).with_context(|| format!("Failed to write {}", path.display()))
}
