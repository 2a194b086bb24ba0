//! Built-in structure definitions.

use strata_core::{Catalog, DropConfig, Options, Result, Selector, StructureDescriptor};

/// Structures users can pick with `--structure`
pub const TOP_LEVEL: &[(&str, &str)] = &[
    ("bmp", "Windows bitmap file and info headers"),
    ("wav", "RIFF header with a WAVE body"),
    ("riff", "RIFF header replaced by its form body"),
    ("image", "Image file recognised by its magic bytes"),
];

fn text(length: usize) -> Options {
    Options::new().with("length", length)
}

/// Builds the catalog of built-in formats
pub fn builtin_catalog(config: DropConfig) -> Result<Catalog> {
    let mut catalog = Catalog::new().with_config(config);

    catalog.define(
        StructureDescriptor::builder("bmp")
            .structure("file_header", "bmp_file_header")
            .structure("info_header", "bmp_info_header"),
    )?;
    catalog.define(
        StructureDescriptor::builder("bmp_file_header")
            .field_with("signature", "ascii", text(2))
            .field("file_size", "uint32le")
            .field("reserved1", "uint16le")
            .field("reserved2", "uint16le")
            .field("pixel_offset", "uint32le"),
    )?;
    catalog.define(
        StructureDescriptor::builder("bmp_info_header")
            .field("header_size", "uint32le")
            .field("width", "int32le")
            .field("height", "int32le")
            .field("planes", "uint16le")
            .field("bit_count", "uint16le")
            .field("compression", "uint32le")
            .field("image_size", "uint32le")
            .field("x_pixels_per_meter", "int32le")
            .field("y_pixels_per_meter", "int32le")
            .field("colors_used", "uint32le")
            .field("colors_important", "uint32le"),
    )?;

    // the magic is peeked, so the selected format starts at the same offset
    catalog.define(
        StructureDescriptor::builder("image")
            .field_with("magic", "ascii", text(2).with("peek", true))
            .switch("magic", true, Selector::table([("BM", "bmp")], "opaque")),
    )?;

    let forms = || Selector::table([("WAVE", "wave")], "opaque");

    catalog.define(
        StructureDescriptor::builder("wav")
            .field_with("chunk_id", "ascii", text(4))
            .field("chunk_size", "uint32le")
            .field_with("form_type", "ascii", text(4))
            .switch("form_type", false, forms()),
    )?;
    catalog.define(
        StructureDescriptor::builder("riff")
            .field_with("chunk_id", "ascii", text(4))
            .field("chunk_size", "uint32le")
            .field_with("form_type", "ascii", text(4))
            .switch("form_type", true, forms()),
    )?;
    catalog.define(
        StructureDescriptor::builder("wave")
            .structure("format", "wave_fmt")
            .structure("data", "chunk_header"),
    )?;
    catalog.define(
        StructureDescriptor::builder("wave_fmt")
            .field_with("chunk_id", "ascii", text(4))
            .field("chunk_size", "uint32le")
            .field("audio_format", "uint16le")
            .field("channels", "uint16le")
            .field("sample_rate", "uint32le")
            .field("byte_rate", "uint32le")
            .field("block_align", "uint16le")
            .field("bits_per_sample", "uint16le"),
    )?;
    catalog.define(
        StructureDescriptor::builder("chunk_header")
            .field_with("chunk_id", "ascii", text(4))
            .field("chunk_size", "uint32le"),
    )?;
    catalog.define(
        StructureDescriptor::builder("opaque").unknown("body", Options::new()),
    )?;

    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::Value;

    fn wav_bytes() -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(b"RIFF");
        data.extend_from_slice(&36u32.to_le_bytes());
        data.extend_from_slice(b"WAVE");
        data.extend_from_slice(b"fmt ");
        data.extend_from_slice(&16u32.to_le_bytes());
        data.extend_from_slice(&1u16.to_le_bytes());
        data.extend_from_slice(&2u16.to_le_bytes());
        data.extend_from_slice(&44_100u32.to_le_bytes());
        data.extend_from_slice(&176_400u32.to_le_bytes());
        data.extend_from_slice(&4u16.to_le_bytes());
        data.extend_from_slice(&16u16.to_le_bytes());
        data.extend_from_slice(b"data");
        data.extend_from_slice(&0u32.to_le_bytes());
        data
    }

    #[test]
    fn test_top_level_registered() {
        let catalog = builtin_catalog(DropConfig::default()).unwrap();
        for (name, _) in TOP_LEVEL {
            assert!(catalog.structures().contains(name), "missing {}", name);
        }
    }

    #[test]
    fn test_wav() {
        let catalog = builtin_catalog(DropConfig::default()).unwrap();
        let data = wav_bytes();
        let wav = catalog.drop("wav", &data, 0).unwrap();

        assert_eq!(wav.length, data.len());
        let wave = wav.child("wave").unwrap();
        let format = wave.child("format").unwrap();
        assert_eq!(
            format.child("sample_rate").unwrap().value(),
            Some(&Value::Unsigned(44_100))
        );
    }

    #[test]
    fn test_riff_replaced_by_body() {
        let catalog = builtin_catalog(DropConfig::default()).unwrap();
        let riff = catalog.drop("riff", &wav_bytes(), 0).unwrap();

        assert_eq!(riff.name, "wave");
        assert_eq!(riff.offset, 12);
    }

    fn bmp_bytes() -> Vec<u8> {
        let mut data = vec![0u8; 54];
        data[..2].copy_from_slice(b"BM");
        data[2..6].copy_from_slice(&54u32.to_le_bytes());
        data
    }

    #[test]
    fn test_image_sniffs_bmp() {
        let catalog = builtin_catalog(DropConfig::default()).unwrap();
        let image = catalog.drop("image", &bmp_bytes(), 0).unwrap();

        assert_eq!(image.name, "bmp");
        assert_eq!(image.offset, 0);
        assert_eq!(image.length, 54);
        let file_header = image.child("file_header").unwrap();
        let field = |name| file_header.child(name).unwrap().value().cloned();
        assert_eq!(field("signature"), Some(Value::from("BM")));
        assert_eq!(field("file_size"), Some(Value::Unsigned(54)));
    }

    #[test]
    fn test_image_unknown_magic() {
        let catalog = builtin_catalog(DropConfig::default()).unwrap();
        let image = catalog.drop("image", b"GIF89a", 0).unwrap();

        assert_eq!(image.name, "opaque");
        assert_eq!(image.length, 0);
    }

    #[test]
    fn test_bmp_headers() {
        let mut data = bmp_bytes();
        data[14..18].copy_from_slice(&40u32.to_le_bytes());
        data[18..22].copy_from_slice(&(-3i32).to_le_bytes());

        let catalog = builtin_catalog(DropConfig::default()).unwrap();
        let bmp = catalog.drop("bmp", &data, 0).unwrap();

        assert_eq!(bmp.length, 54);
        let info = bmp.child("info_header").unwrap();
        assert_eq!(info.offset, 14);
        assert_eq!(info.child("width").unwrap().value(), Some(&Value::Signed(-3)));
    }
}
