extern crate icocur;

use byteorder::{LittleEndian, WriteBytesExt};
use icocur::{EntryFields, IcoError, RasterImage, ResourceType};
use std::io::{Cursor, Seek, SeekFrom};

//===========================================================================//

#[test]
fn decode_favicon_metadata() {
    let file = favicon();
    let icondir = icocur::decode_metadata(file.as_slice()).unwrap();
    assert_eq!(icondir.resource_type(), ResourceType::Icon);
    assert_eq!(icondir.entries().len(), 3);
    assert_eq!(icondir.largest_index(), 2);
    for (entry, &size) in icondir.entries().iter().zip([16, 32, 48].iter()) {
        assert_eq!(entry.width(), size);
        assert_eq!(entry.height(), size);
        assert_eq!(entry.num_colors(), 0);
        assert_eq!(entry.auxiliary(), (0, 0));
        assert!(entry.image().is_none());
    }
}

#[test]
fn decode_favicon_images() {
    let file = favicon();
    let (icondir, images) = icocur::decode(Cursor::new(&file)).unwrap();
    assert_eq!(images.len(), 3);
    for (index, &size) in [16u32, 32, 48].iter().enumerate() {
        assert_eq!(images[index], opaque_gradient(size));
        assert!(icondir.entries()[index].image().is_none());
    }
    assert_eq!(images[icondir.largest_index()].width(), 48);

    // Reading the directory directly leaves each image on its entry.
    let icondir = icocur::IconDir::read(Cursor::new(&file)).unwrap();
    for (entry, image) in icondir.entries().iter().zip(images.iter()) {
        assert_eq!(entry.image(), Some(image));
    }
}

#[test]
fn decode_256px_bgra_icon() {
    // Directory bytes of zero mean 256, and the payload's BI_RGB pixels carry
    // the alpha channel in their fourth byte.
    let size = 256u32;
    let mut file = Vec::<u8>::new();
    write_header(&mut file, 1, 1);
    let payload = bgra_payload(size, |x, y| {
        [x as u8, y as u8, 0x80, (x ^ y) as u8]
    });
    write_record(&mut file, 0, 0, 1, 32, payload.len() as u32, 22);
    file.extend_from_slice(&payload);

    let icondir = icocur::decode_metadata(file.as_slice()).unwrap();
    assert_eq!(icondir.entries()[0].width(), 256);
    assert_eq!(icondir.entries()[0].height(), 256);

    let (_, images) = icocur::decode(Cursor::new(&file)).unwrap();
    let image = &images[0];
    assert_eq!((image.width(), image.height()), (256, 256));
    let rgba = image.rgba_data();
    for &(x, y) in &[(0usize, 0usize), (255, 0), (0, 255), (17, 200)] {
        let start = 4 * (y * 256 + x);
        let expected = [0x80, y as u8, x as u8, (x ^ y) as u8];
        assert_eq!(&rgba[start..start + 4], &expected[..], "pixel {x},{y}");
    }
}

#[test]
fn decode_cursor_hotspot() {
    let mut file = Vec::<u8>::new();
    write_header(&mut file, 2, 1);
    let payload = bgra_payload(4, |_, _| [1, 2, 3, 255]);
    write_record(&mut file, 4, 4, 2, 3, payload.len() as u32, 22);
    file.extend_from_slice(&payload);
    let (icondir, images) = icocur::decode(Cursor::new(&file)).unwrap();
    assert_eq!(icondir.resource_type(), ResourceType::Cursor);
    let entry = &icondir.entries()[0];
    assert_eq!(entry.cursor_hotspot(), Some((2, 3)));
    assert_eq!(entry.auxiliary(), (2, 3));
    assert_eq!(entry.fields(), EntryFields::Cursor { hotspot_x: 2, hotspot_y: 3 });
    assert_eq!(images[0].rgba_data()[0..4], [3, 2, 1, 255]);
}

#[test]
fn decode_container_inside_larger_stream() {
    let mut stream = b"PREFIX".to_vec();
    stream.extend_from_slice(&favicon());
    let mut reader = Cursor::new(stream);
    reader.seek(SeekFrom::Start(6)).unwrap();
    let (icondir, images) = icocur::decode(reader).unwrap();
    assert_eq!(icondir.entries().len(), 3);
    assert_eq!(images[0], opaque_gradient(16));
}

#[test]
fn decode_truncated_payload() {
    let mut file = favicon();
    file.truncate(file.len() - 1);
    let error = icocur::decode(Cursor::new(&file)).unwrap_err();
    assert!(matches!(error, IcoError::TruncatedStream(_)));
}

#[test]
fn decode_rejects_each_format_error_distinctly() {
    let mut file = favicon();
    file[4] = 0;
    file[5] = 0;
    let error = icocur::decode_metadata(file.as_slice()).unwrap_err();
    assert!(matches!(error, IcoError::EmptyContainer));

    let mut file = favicon();
    file[1] = 1;
    let error = icocur::decode_metadata(file.as_slice()).unwrap_err();
    assert!(matches!(error, IcoError::MalformedContainer(_)));

    let mut file = favicon();
    file[6 + 16 + 8..6 + 16 + 12].copy_from_slice(&[0, 0, 0, 0]);
    let error = icocur::decode_metadata(file.as_slice()).unwrap_err();
    assert!(matches!(error, IcoError::InvalidPayloadSize { index: 1 }));

    let mut file = favicon();
    file[6 + 32 + 12..6 + 32 + 16].copy_from_slice(&[53, 0, 0, 0]);
    let error = icocur::decode_metadata(file.as_slice()).unwrap_err();
    assert!(matches!(
        error,
        IcoError::InvalidOffset { index: 2, offset: 53, minimum: 54 }
    ));
}

//===========================================================================//

fn opaque_gradient(size: u32) -> RasterImage {
    let mut rgba = Vec::new();
    for y in 0..size {
        for x in 0..size {
            rgba.extend_from_slice(&[(x * 5) as u8, (y * 5) as u8, 0x40, 0xff]);
        }
    }
    RasterImage::from_rgba_data(size, size, rgba)
}

/// A 16x16, 32x32, and 48x48 truecolor icon.
fn favicon() -> Vec<u8> {
    let images: Vec<RasterImage> =
        [16, 32, 48].iter().map(|&size| opaque_gradient(size)).collect();
    let icondir = icocur::build_icon_metadata(&images).unwrap();
    let mut file = Cursor::new(Vec::new());
    icocur::encode(&mut file, &icondir, &images).unwrap();
    file.into_inner()
}

fn write_header(file: &mut Vec<u8>, restype: u16, count: u16) {
    file.write_u16::<LittleEndian>(0).unwrap();
    file.write_u16::<LittleEndian>(restype).unwrap();
    file.write_u16::<LittleEndian>(count).unwrap();
}

fn write_record(
    file: &mut Vec<u8>,
    width: u8,
    height: u8,
    first: u16,
    second: u16,
    size: u32,
    offset: u32,
) {
    file.extend_from_slice(&[width, height, 0, 0]);
    file.write_u16::<LittleEndian>(first).unwrap();
    file.write_u16::<LittleEndian>(second).unwrap();
    file.write_u32::<LittleEndian>(size).unwrap();
    file.write_u32::<LittleEndian>(offset).unwrap();
}

/// Builds a square 32-bpp BI_RGB payload (with doubled height and no AND
/// mask) whose pixel at column x, row y (from the top) is `bgra(x, y)`.
fn bgra_payload<F>(size: u32, bgra: F) -> Vec<u8>
where
    F: Fn(u32, u32) -> [u8; 4],
{
    let mut data = Vec::new();
    data.write_u32::<LittleEndian>(40).unwrap();
    data.write_i32::<LittleEndian>(size as i32).unwrap();
    data.write_i32::<LittleEndian>(2 * size as i32).unwrap();
    data.write_u16::<LittleEndian>(1).unwrap();
    data.write_u16::<LittleEndian>(32).unwrap();
    for _ in 0..6 {
        data.write_u32::<LittleEndian>(0).unwrap();
    }
    for y in (0..size).rev() {
        for x in 0..size {
            data.extend_from_slice(&bgra(x, y));
        }
    }
    data
}

//===========================================================================//
