/// ITAB mhd header record
///
/// The mhd file describes an ITAB acquisition: subject, sampling, channel
/// table, fiducial markers and the layout of the companion `.raw` file.
/// Decoding the proprietary binary layout is delegated to a [`HeaderSource`];
/// this module defines the record every source must produce.
use crate::error::{ItabError, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Sensor position and orientation (position in millimeters)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MhdPosition {
    pub posx: f64,
    pub posy: f64,
    pub posz: f64,
    #[serde(default)]
    pub orix: f64,
    #[serde(default)]
    pub oriy: f64,
    #[serde(default)]
    pub oriz: f64,
}

/// One channel record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MhdChannel {
    #[serde(rename = "type")]
    pub type_: i32,
    pub label: String,
    #[serde(default)]
    pub pos: Vec<MhdPosition>,
    pub calib: f64,  // Raw units per physical unit
    pub amvbit: f64, // Amplitude per bit
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub flag: i32, // > 0 marks a disabled channel
}

/// Fiducial or HPI coil marker (millimeters, head frame)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MhdMarker {
    #[serde(default)]
    pub label: String,
    pub posx: f64,
    pub posy: f64,
    pub posz: f64,
}

/// Trigger table entry
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MhdSample {
    pub start: i64,
    #[serde(rename = "type")]
    pub type_: i32,
    pub quality: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MhdSubjectInfo {
    #[serde(default)]
    pub sex: i32,
}

/// Parsed mhd header
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MhdHeader {
    pub smpfq: f64,
    pub date: String,
    pub time: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub subinfo: MhdSubjectInfo,
    #[serde(default)]
    pub notes: String,
    pub hw_low_fr: f64,
    pub hw_hig_fr: f64,
    pub nchan: usize,
    pub ch: Vec<MhdChannel>,
    pub num_markers: usize,
    #[serde(default)]
    pub marker: Vec<MhdMarker>,
    pub ntpdata: usize,
    pub start_data: u64,
    #[serde(default)]
    pub nsmpl: usize,
    #[serde(default)]
    pub sample: Vec<MhdSample>,
}

/// Produces an [`MhdHeader`] from a header file
pub trait HeaderSource {
    fn read_header(&self, path: &Path) -> Result<MhdHeader>;
}

/// Header source for mhd records exported as JSON
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonHeaderSource;

impl HeaderSource for JsonHeaderSource {
    fn read_header(&self, path: &Path) -> Result<MhdHeader> {
        let file = File::open(path)?;
        let header: MhdHeader = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| ItabError::InvalidHeader(format!("{}: {}", path.display(), e)))?;
        log::debug!(
            "Read mhd header {}: {} channels, {} samples",
            path.display(),
            header.nchan,
            header.ntpdata
        );
        Ok(header)
    }
}

/// Locate the mhd header belonging to a `.raw` data file.
///
/// Tries `<file>.raw.mhd` first, then the `<file>.mhd` sibling.
pub fn mhd_path_for(raw_path: &Path) -> Result<PathBuf> {
    let mut appended = raw_path.as_os_str().to_owned();
    appended.push(".mhd");
    let appended = PathBuf::from(appended);
    if appended.is_file() {
        return Ok(appended);
    }

    let sibling = raw_path.with_extension("mhd");
    if sibling.is_file() {
        return Ok(sibling);
    }

    Err(ItabError::HeaderNotFound(appended.display().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const HEADER_JSON: &str = r#"{
        "smpfq": 1024.0,
        "date": "12/01/2020",
        "time": "14:30:05",
        "first_name": "Ada",
        "last_name": "Lovelace",
        "subinfo": { "sex": 2 },
        "notes": "resting state",
        "hw_low_fr": 250.0,
        "hw_hig_fr": 0.16,
        "nchan": 1,
        "ch": [
            { "type": 1, "label": "MAG_001",
              "pos": [ { "posx": 10.0, "posy": 20.0, "posz": 30.0,
                         "orix": 0.0, "oriy": 0.0, "oriz": 1.0 } ],
              "calib": 2.0, "amvbit": 1.0, "unit": "fT", "flag": 0 }
        ],
        "num_markers": 4,
        "marker": [
            { "posx": 0.0, "posy": 90.0, "posz": 0.0 },
            { "posx": 70.0, "posy": 0.0, "posz": 0.0 },
            { "posx": -70.0, "posy": 0.0, "posz": 0.0 },
            { "posx": 0.0, "posy": 0.0, "posz": 120.0 }
        ],
        "ntpdata": 2048,
        "start_data": 8192,
        "nsmpl": 1,
        "sample": [ { "start": 100, "type": 1, "quality": 0 } ]
    }"#;

    #[test]
    fn test_json_header_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run01.raw.mhd");
        File::create(&path)
            .unwrap()
            .write_all(HEADER_JSON.as_bytes())
            .unwrap();

        let mhd = JsonHeaderSource.read_header(&path).unwrap();
        assert_eq!(mhd.smpfq, 1024.0);
        assert_eq!(mhd.nchan, 1);
        assert_eq!(mhd.ch[0].type_, 1);
        assert_eq!(mhd.ch[0].label, "MAG_001");
        assert_eq!(mhd.ch[0].pos[0].oriz, 1.0);
        assert_eq!(mhd.subinfo.sex, 2);
        assert_eq!(mhd.marker.len(), 4);
        assert_eq!(mhd.start_data, 8192);
        assert_eq!(mhd.sample[0].start, 100);
    }

    #[test]
    fn test_json_header_source_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.mhd");
        File::create(&path).unwrap().write_all(b"{ \"smpfq\": ").unwrap();

        let err = JsonHeaderSource.read_header(&path).unwrap_err();
        assert!(matches!(err, ItabError::InvalidHeader(_)));
    }

    #[test]
    fn test_mhd_path_for() {
        let dir = tempfile::tempdir().unwrap();
        let raw = dir.path().join("run01.raw");

        assert!(matches!(
            mhd_path_for(&raw),
            Err(ItabError::HeaderNotFound(_))
        ));

        let sibling = dir.path().join("run01.mhd");
        File::create(&sibling).unwrap();
        assert_eq!(mhd_path_for(&raw).unwrap(), sibling);

        let appended = dir.path().join("run01.raw.mhd");
        File::create(&appended).unwrap();
        assert_eq!(mhd_path_for(&raw).unwrap(), appended);
    }
}
