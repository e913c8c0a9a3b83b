/// ITAB and FIFF constants
/// FIFF values follow MNE-Python's _fiff/constants.py

// ITAB channel type codes (mhd channel record `type`)
pub const ITABV_MAG_CH: i32 = 1; // Magnetic sensor
pub const ITABV_EEG_CH: i32 = 2; // Electric channel
pub const ITABV_REF_EEG_CH: i32 = 3; // Electric reference
pub const ITABV_REF_MAG_CH: i32 = 4; // Magnetic reference
pub const ITABV_REF_AUX_CH: i32 = 5; // Auxiliary reference
pub const ITABV_REF_PARAM_CH: i32 = 6; // Parameter reference
pub const ITABV_REF_DIGIT_CH: i32 = 7; // Digitization reference
pub const ITABV_REF_FLAG_CH: i32 = 8; // Flag reference

// Channel types (FIFFV_*_CH)
pub const FIFFV_MEG_CH: i32 = 1; // MEG channel (magnetometer or gradiometer)
pub const FIFFV_EEG_CH: i32 = 2; // EEG channel
pub const FIFFV_STIM_CH: i32 = 3; // Stimulus channel
pub const FIFFV_BIO_CH: i32 = 102; // Biological channel
pub const FIFFV_MCG_CH: i32 = 201; // MCG channel
pub const FIFFV_EOG_CH: i32 = 202; // EOG channel
pub const FIFFV_REF_MEG_CH: i32 = 301; // MEG reference channel
pub const FIFFV_EMG_CH: i32 = 302; // EMG channel
pub const FIFFV_ECG_CH: i32 = 402; // ECG channel
pub const FIFFV_MISC_CH: i32 = 502; // Miscellaneous channel
pub const FIFFV_RESP_CH: i32 = 602; // Respiration channel

// Coil types
pub const FIFFV_COIL_NONE: i32 = 0;
pub const FIFFV_COIL_POINT_MAGNETOMETER: i32 = 2000;

// Units
pub const FIFF_UNIT_NONE: i32 = -1;
pub const FIFF_UNIT_V: i32 = 107; // Volt
pub const FIFF_UNIT_T: i32 = 112; // Tesla

// Unit multipliers (decimal exponent)
pub const FIFF_UNITM_NONE: i32 = 0;
pub const FIFF_UNITM_M: i32 = -3; // milli
pub const FIFF_UNITM_MU: i32 = -6; // micro
pub const FIFF_UNITM_N: i32 = -9; // nano
pub const FIFF_UNITM_P: i32 = -12; // pico
pub const FIFF_UNITM_F: i32 = -15; // femto

// Coordinate frames (FIFFV_COORD_*)
pub const FIFFV_COORD_UNKNOWN: i32 = 0; // Unknown coordinate frame
pub const FIFFV_COORD_DEVICE: i32 = 1; // Device coordinates (MEG sensor array)
pub const FIFFV_COORD_ISOTRAK: i32 = 2; // Isotrak digitizer coordinates
pub const FIFFV_COORD_HPI: i32 = 3; // HPI coil coordinates
pub const FIFFV_COORD_HEAD: i32 = 4; // Head coordinates (fiducial-based)
pub const FIFFV_COORD_MRI: i32 = 5; // MRI coordinates

// Digitization point kinds
pub const FIFFV_POINT_CARDINAL: i32 = 1;
pub const FIFFV_POINT_HPI: i32 = 2;
pub const FIFFV_POINT_EEG: i32 = 3;
pub const FIFFV_POINT_EXTRA: i32 = 4;

// Cardinal point identifiers
pub const FIFFV_POINT_LPA: i32 = 1;
pub const FIFFV_POINT_NASION: i32 = 2;
pub const FIFFV_POINT_RPA: i32 = 3;

// Subject sex codes
pub const FIFFV_SUBJ_SEX_UNKNOWN: i32 = 0;
pub const FIFFV_SUBJ_SEX_MALE: i32 = 1;
pub const FIFFV_SUBJ_SEX_FEMALE: i32 = 2;

/// Size in bytes of one sample in the ITAB `.raw` payload (big-endian i32)
pub const ITAB_SAMPLE_BYTES: usize = 4;

/// Calibration used for magnetic channels whose header calibration is zero
pub const ITAB_FALLBACK_MAG_CAL: f64 = 0.001;

/// Check if a channel type is a data channel (not stimulus, etc.)
pub fn is_data_channel(kind: i32) -> bool {
    matches!(
        kind,
        FIFFV_MEG_CH
            | FIFFV_REF_MEG_CH
            | FIFFV_EEG_CH
            | FIFFV_BIO_CH
            | FIFFV_MCG_CH
            | FIFFV_EOG_CH
            | FIFFV_EMG_CH
            | FIFFV_ECG_CH
            | FIFFV_MISC_CH
            | FIFFV_RESP_CH
    )
}

/// Get human-readable channel type name
pub fn channel_type_name(kind: i32) -> &'static str {
    match kind {
        FIFFV_MEG_CH => "MEG",
        FIFFV_REF_MEG_CH => "REF_MEG",
        FIFFV_EEG_CH => "EEG",
        FIFFV_BIO_CH => "BIO",
        FIFFV_MCG_CH => "MCG",
        FIFFV_STIM_CH => "STIM",
        FIFFV_EOG_CH => "EOG",
        FIFFV_EMG_CH => "EMG",
        FIFFV_ECG_CH => "ECG",
        FIFFV_MISC_CH => "MISC",
        FIFFV_RESP_CH => "RESP",
        _ => "UNKNOWN",
    }
}

/// Get human-readable coordinate frame name
pub fn coord_frame_name(frame: i32) -> &'static str {
    match frame {
        FIFFV_COORD_UNKNOWN => "Unknown",
        FIFFV_COORD_DEVICE => "Device",
        FIFFV_COORD_ISOTRAK => "Isotrak",
        FIFFV_COORD_HPI => "HPI",
        FIFFV_COORD_HEAD => "Head",
        FIFFV_COORD_MRI => "MRI",
        _ => "Unknown",
    }
}

/// Get human-readable digitization point kind name
pub fn dig_kind_name(kind: i32) -> &'static str {
    match kind {
        FIFFV_POINT_CARDINAL => "Cardinal",
        FIFFV_POINT_HPI => "HPI",
        FIFFV_POINT_EEG => "EEG",
        FIFFV_POINT_EXTRA => "Extra",
        _ => "Unknown",
    }
}

/// Get human-readable unit name
pub fn unit_name(unit: i32) -> &'static str {
    match unit {
        FIFF_UNIT_T => "T",
        FIFF_UNIT_V => "V",
        _ => "",
    }
}

/// Get SI prefix for a unit multiplier
pub fn unit_mul_prefix(unit_mul: i32) -> &'static str {
    match unit_mul {
        FIFF_UNITM_M => "m",
        FIFF_UNITM_MU => "u",
        FIFF_UNITM_N => "n",
        FIFF_UNITM_P => "p",
        FIFF_UNITM_F => "f",
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_data_channel() {
        assert!(is_data_channel(FIFFV_MEG_CH));
        assert!(is_data_channel(FIFFV_BIO_CH));
        assert!(is_data_channel(FIFFV_MISC_CH));

        assert!(!is_data_channel(FIFFV_STIM_CH));
        assert!(!is_data_channel(999)); // Unknown type
    }

    #[test]
    fn test_channel_type_name() {
        assert_eq!(channel_type_name(FIFFV_MEG_CH), "MEG");
        assert_eq!(channel_type_name(FIFFV_BIO_CH), "BIO");
        assert_eq!(channel_type_name(FIFFV_MISC_CH), "MISC");
        assert_eq!(channel_type_name(FIFFV_STIM_CH), "STIM");
        assert_eq!(channel_type_name(999), "UNKNOWN");
    }

    #[test]
    fn test_coord_frame_name() {
        assert_eq!(coord_frame_name(FIFFV_COORD_HEAD), "Head");
        assert_eq!(coord_frame_name(FIFFV_COORD_DEVICE), "Device");
        assert_eq!(coord_frame_name(999), "Unknown");
    }

    #[test]
    fn test_unit_labels() {
        assert_eq!(
            format!("{}{}", unit_mul_prefix(FIFF_UNITM_F), unit_name(FIFF_UNIT_T)),
            "fT"
        );
        assert_eq!(
            format!("{}{}", unit_mul_prefix(FIFF_UNITM_M), unit_name(FIFF_UNIT_V)),
            "mV"
        );
        assert_eq!(unit_name(FIFF_UNIT_NONE), "");
        assert_eq!(unit_mul_prefix(FIFF_UNITM_NONE), "");
    }

    #[test]
    fn test_constant_values() {
        // Verify critical constants match MNE-Python values
        assert_eq!(FIFFV_MEG_CH, 1);
        assert_eq!(FIFFV_BIO_CH, 102);
        assert_eq!(FIFFV_MISC_CH, 502);
        assert_eq!(FIFFV_COIL_POINT_MAGNETOMETER, 2000);
        assert_eq!(FIFF_UNIT_T, 112);
        assert_eq!(FIFF_UNIT_V, 107);
        assert_eq!(FIFF_UNITM_F, -15);
        assert_eq!(FIFF_UNITM_P, -12);
        assert_eq!(FIFFV_COORD_HEAD, 4);
        assert_eq!(FIFFV_POINT_NASION, 2);
        assert_eq!(FIFFV_POINT_LPA, 1);
        assert_eq!(FIFFV_POINT_RPA, 3);
    }
}
