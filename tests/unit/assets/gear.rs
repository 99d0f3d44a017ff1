use super::*;
use crate::assets::decode::{PreparedGraphic, decode_graphic};

#[test]
fn names_roundtrip_through_from_str() {
    for g in GearKind::ALL {
        assert_eq!(g.name().parse::<GearKind>().unwrap(), g);
        assert_eq!(g.to_string(), g.name());
    }
    assert_eq!(" Crown ".parse::<GearKind>().unwrap(), GearKind::Crown);
    assert!("tiara".parse::<GearKind>().is_err());
}

#[test]
fn serde_uses_kebab_case() {
    let json = serde_json::to_string(&GearKind::SaberBlue).unwrap();
    assert_eq!(json, "\"saber-blue\"");
    let g: GearKind = serde_json::from_str("\"saber-red\"").unwrap();
    assert_eq!(g, GearKind::SaberRed);
}

#[test]
fn bundled_gear_decodes_as_svg_with_expected_aspect() {
    for g in GearKind::ALL {
        let graphic = decode_graphic(g.svg_bytes()).unwrap();
        assert!(matches!(graphic, PreparedGraphic::Svg(_)), "{g}");
    }
    let crown = decode_graphic(GearKind::Crown.svg_bytes()).unwrap();
    let size = crown.natural_size();
    assert_eq!((size.width, size.height), (200.0, 140.0));

    let saber = decode_graphic(GearKind::SaberBlue.svg_bytes()).unwrap();
    assert!(saber.natural_size().height > saber.natural_size().width);
}
