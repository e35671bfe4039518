use sanatio_domain::SubjectCatalog;

use super::{RouteGuardConfig, parse_segment_map};

#[test]
fn segment_map_parses_pairs() {
    let parsed = parse_segment_map(" charges = hospitalCharge ,beds=bed,");
    assert!(matches!(
        parsed.as_deref(),
        Ok([(first_segment, first_subject), (second_segment, second_subject)])
            if first_segment == "charges"
                && first_subject == "hospitalCharge"
                && second_segment == "beds"
                && second_subject == "bed"
    ));
}

#[test]
fn empty_segment_map_is_allowed() {
    assert!(matches!(parse_segment_map("").as_deref(), Ok([])));
}

#[test]
fn segment_map_rejects_entries_without_separator() {
    assert!(parse_segment_map("charges").is_err());
}

#[test]
fn default_guard_protects_doctor_area() {
    let catalog = SubjectCatalog::hospital_default();
    let Ok(area) = RouteGuardConfig::default().protected_area(&catalog) else {
        panic!("default guard config should be valid");
    };

    assert_eq!(area.root(), "/doctor");
    assert!(area.contains("/doctor/patient"));
    assert!(!area.contains("/sign-in"));
}

#[test]
fn guard_rejects_unknown_mapped_subjects() {
    let config = RouteGuardConfig {
        segment_subjects: vec![("charges".to_owned(), "fees".to_owned())],
        ..RouteGuardConfig::default()
    };

    assert!(
        config
            .protected_area(&SubjectCatalog::hospital_default())
            .is_err()
    );
}

#[test]
fn guard_rejects_sign_in_page_inside_protected_area() {
    let config = RouteGuardConfig {
        sign_in_path: "/doctor/sign-in".to_owned(),
        ..RouteGuardConfig::default()
    };

    assert!(
        config
            .protected_area(&SubjectCatalog::hospital_default())
            .is_err()
    );
}

#[test]
fn guard_rejects_site_wide_root() {
    let config = RouteGuardConfig {
        root: "/".to_owned(),
        ..RouteGuardConfig::default()
    };

    assert!(
        config
            .protected_area(&SubjectCatalog::hospital_default())
            .is_err()
    );
}

#[test]
fn guard_requires_absolute_sign_in_path() {
    let config = RouteGuardConfig {
        sign_in_path: "sign-in".to_owned(),
        ..RouteGuardConfig::default()
    };

    assert!(
        config
            .protected_area(&SubjectCatalog::hospital_default())
            .is_err()
    );
}
