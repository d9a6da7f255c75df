// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[parameterized(
    bambu = { "bambu_lab", PrinterClass::BambuLab },
    flash_forge_dashed = { "flash-forge", PrinterClass::FlashForge },
    upper = { "PRUSA", PrinterClass::Prusa },
    padded = { " klipper ", PrinterClass::Klipper },
)]
fn parses_class_keys(input: &str, expected: PrinterClass) {
    assert_eq!(input.parse::<PrinterClass>().unwrap(), expected);
}

#[test]
fn rejects_vendor_names_that_are_not_keys() {
    let err = "Bambu Lab".parse::<PrinterClass>().unwrap_err();
    assert!(err.to_string().contains("unknown printer class 'Bambu Lab'"));
}

#[test]
fn display_round_trips_through_from_str() {
    for class in PrinterClass::ALL {
        assert_eq!(class.to_string().parse::<PrinterClass>().unwrap(), class);
    }
}

#[test]
fn serde_uses_snake_case_keys() {
    let json = serde_json::to_string(&PrinterClass::FlashForge).unwrap();
    assert_eq!(json, "\"flash_forge\"");
}
