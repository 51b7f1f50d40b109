//! Fixture builders for `.ipa` archives used across the unit tests.

use plist::{Dictionary, Value};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

#[derive(Debug, Clone, Copy)]
pub enum PlistFormat {
    Xml,
    Binary,
}

#[derive(Debug, Clone, Default)]
pub struct InfoFields {
    pub bundle_identifier: String,
    pub version: String,
    pub display_name: Option<String>,
    pub bundle_name: Option<String>,
    pub min_os: Option<String>,
}

impl InfoFields {
    pub fn new(bundle_identifier: &str, version: &str) -> Self {
        Self {
            bundle_identifier: bundle_identifier.to_string(),
            version: version.to_string(),
            ..Default::default()
        }
    }

    pub fn display_name(mut self, name: &str) -> Self {
        self.display_name = Some(name.to_string());
        self
    }

    pub fn bundle_name(mut self, name: &str) -> Self {
        self.bundle_name = Some(name.to_string());
        self
    }

    pub fn min_os(mut self, version: &str) -> Self {
        self.min_os = Some(version.to_string());
        self
    }

    fn to_plist(&self, format: PlistFormat) -> Vec<u8> {
        let mut dict = Dictionary::new();
        dict.insert(
            "CFBundleIdentifier".to_string(),
            Value::String(self.bundle_identifier.clone()),
        );
        dict.insert(
            "CFBundleShortVersionString".to_string(),
            Value::String(self.version.clone()),
        );
        dict.insert("CFBundleVersion".to_string(), Value::String("100".to_string()));
        if let Some(name) = &self.display_name {
            dict.insert("CFBundleDisplayName".to_string(), Value::String(name.clone()));
        }
        if let Some(name) = &self.bundle_name {
            dict.insert("CFBundleName".to_string(), Value::String(name.clone()));
        }
        if let Some(min_os) = &self.min_os {
            dict.insert("MinimumOSVersion".to_string(), Value::String(min_os.clone()));
        }

        let mut bytes = Vec::new();
        let value = Value::Dictionary(dict);
        match format {
            PlistFormat::Xml => value.to_writer_xml(&mut bytes).unwrap(),
            PlistFormat::Binary => value.to_writer_binary(&mut bytes).unwrap(),
        }
        bytes
    }
}

pub fn write_zip(path: &Path, entries: &[(&str, &[u8])]) {
    write_zip_with_comment(path, entries, "");
}

fn write_zip_with_comment(path: &Path, entries: &[(&str, &[u8])], comment: &str) {
    let mut zip = ZipWriter::new(File::create(path).unwrap());
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for (name, content) in entries {
        zip.start_file(*name, options).unwrap();
        zip.write_all(content).unwrap();
    }

    if !comment.is_empty() {
        zip.set_comment(comment.to_string());
    }
    zip.finish().unwrap();
}

/// Write an `.ipa` with the given descriptor, preceded by a nested framework `Info.plist`
/// that must never be picked up.
pub fn write_ipa(path: &Path, fields: &InfoFields, format: PlistFormat) {
    let framework = InfoFields::new("com.vendor.kit", "9.9.9").to_plist(PlistFormat::Xml);
    let descriptor = fields.to_plist(format);

    write_zip(
        path,
        &[
            (
                "Payload/Example.app/Frameworks/Kit.framework/Info.plist",
                framework.as_slice(),
            ),
            ("Payload/Example.app/Example", b"\xCF\xFA\xED\xFE".as_slice()),
            ("Payload/Example.app/Info.plist", descriptor.as_slice()),
        ],
    );
}

/// An `.ipa` holding only the descriptor, padded with an archive comment so the file is
/// exactly `size` bytes.
pub fn write_ipa_sized(path: &Path, fields: &InfoFields, format: PlistFormat, size: u64) {
    let descriptor = fields.to_plist(format);
    let entries = [("Payload/App.app/Info.plist", descriptor.as_slice())];

    write_zip(path, &entries);
    let unpadded = std::fs::metadata(path).unwrap().len();
    assert!(unpadded <= size, "fixture already larger than {size} bytes");

    let padding = "#".repeat((size - unpadded) as usize);
    write_zip_with_comment(path, &entries, &padding);
    assert_eq!(std::fs::metadata(path).unwrap().len(), size);
}
