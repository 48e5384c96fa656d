/// Binary image database format
///
/// ```text
/// u32 LE  magic
/// per image, in library order:
///   i32 LE  width
///   i32 LE  height
///   width * height luminance bytes
/// ```
///
/// There is no image count or name table; a reader must already know the
/// library's images and their order.

use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};
use std::path::Path;

use crate::color::ConvertedImage;
use crate::error::{BuildError, Result};

/// Leading tag of every database file ("IMDB" on disk)
pub const MAGIC: u32 = 0x4244_4D49;

/// Extension of database files, named after their library id
pub const DATABASE_EXTENSION: &str = "imgpak";

/// Serialize converted images, always little-endian
pub fn write_database<W: Write>(writer: &mut W, images: &[ConvertedImage]) -> Result<()> {
    writer.write_all(&MAGIC.to_le_bytes())?;

    for image in images {
        let overflow = || BuildError::DimensionOverflow {
            width: image.width,
            height: image.height,
        };
        let width = i32::try_from(image.width).map_err(|_| overflow())?;
        let height = i32::try_from(image.height).map_err(|_| overflow())?;
        debug_assert_eq!(image.data.len(), image.width as usize * image.height as usize);

        writer.write_all(&width.to_le_bytes())?;
        writer.write_all(&height.to_le_bytes())?;
        writer.write_all(&image.data)?;
    }

    Ok(())
}

/// Create (or truncate) `path` and write the database into it
///
/// A partially written file is removed again if anything fails.
pub fn write_database_file(path: &Path, images: &[ConvertedImage]) -> Result<()> {
    let result = File::create(path)
        .map_err(BuildError::from)
        .and_then(|file| {
            let mut writer = BufWriter::new(file);
            write_database(&mut writer, images)?;
            writer.flush()?;
            Ok(())
        });

    if result.is_err() {
        let _ = fs::remove_file(path);
    }
    result
}

/// Decode a database holding `image_count` images
pub fn read_database<R: Read>(reader: &mut R, image_count: usize) -> io::Result<Vec<ConvertedImage>> {
    let magic = u32::from_le_bytes(read_array(reader)?);
    if magic != MAGIC {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("bad image database magic {magic:#010x}"),
        ));
    }

    let mut images = Vec::with_capacity(image_count);
    for _ in 0..image_count {
        let width = i32::from_le_bytes(read_array(reader)?);
        let height = i32::from_le_bytes(read_array(reader)?);
        let (width, height) = match (u32::try_from(width), u32::try_from(height)) {
            (Ok(w), Ok(h)) => (w, h),
            _ => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("negative image dimensions {width}x{height}"),
                ))
            }
        };

        let mut data = vec![0u8; width as usize * height as usize];
        reader.read_exact(&mut data)?;
        images.push(ConvertedImage { width, height, data });
    }

    Ok(images)
}

fn read_array<R: Read>(reader: &mut R) -> io::Result<[u8; 4]> {
    let mut bytes = [0u8; 4];
    reader.read_exact(&mut bytes)?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn image(width: u32, height: u32, fill: u8) -> ConvertedImage {
        ConvertedImage {
            width,
            height,
            data: vec![fill; (width * height) as usize],
        }
    }

    #[test]
    fn test_layout_is_little_endian() {
        let mut bytes = Vec::new();
        write_database(&mut bytes, &[image(258, 1, 7)]).unwrap();

        assert_eq!(&bytes[0..4], b"IMDB");
        assert_eq!(&bytes[4..8], &[2, 1, 0, 0]);
        assert_eq!(&bytes[8..12], &[1, 0, 0, 0]);
        assert_eq!(bytes.len(), 12 + 258);
        assert!(bytes[12..].iter().all(|&b| b == 7));
    }

    #[test]
    fn test_images_are_packed_in_order() {
        let images = vec![image(1, 1, 1), image(2, 1, 2), image(1, 3, 3)];
        let mut bytes = Vec::new();
        write_database(&mut bytes, &images).unwrap();

        // No padding between records
        assert_eq!(bytes.len(), 4 + 3 * 8 + 1 + 2 + 3);

        let decoded = read_database(&mut bytes.as_slice(), 3).unwrap();
        assert_eq!(decoded, images);
    }

    #[test]
    fn test_empty_library_is_magic_only() {
        let mut bytes = Vec::new();
        write_database(&mut bytes, &[]).unwrap();
        assert_eq!(bytes, MAGIC.to_le_bytes());
    }

    #[test]
    fn test_bad_magic_rejected() {
        let bytes = [0u8; 4];
        let err = read_database(&mut bytes.as_slice(), 0).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_truncated_file_rejected() {
        let mut bytes = Vec::new();
        write_database(&mut bytes, &[image(4, 4, 0)]).unwrap();
        bytes.truncate(bytes.len() - 1);

        let err = read_database(&mut bytes.as_slice(), 1).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_file_is_overwritten() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(format!("lib.{DATABASE_EXTENSION}"));

        write_database_file(&path, &[image(8, 8, 1), image(8, 8, 2)]).unwrap();
        write_database_file(&path, &[image(1, 1, 9)]).unwrap();

        let bytes = fs::read(&path).unwrap();
        assert_eq!(bytes.len(), 4 + 8 + 1);
    }

    #[test]
    fn test_failed_write_leaves_no_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing-dir").join("lib.imgpak");

        assert!(write_database_file(&path, &[image(1, 1, 0)]).is_err());
        assert!(!path.exists());
    }
}
