use auction_scout::extract::extract_mileage_from_title;
use auction_scout::models::{Transmission, VehicleInput};
use auction_scout::normalize::{normalize_make, normalize_torque, normalize_vehicle, normalize_year};

#[test]
fn documented_examples() {
    assert_eq!(extract_mileage_from_title("4,400-Mile 1988 Ferrari Testarossa"), Some(4400));
    assert_eq!(extract_mileage_from_title("43K-Mile 1988 Audi 90 Quattro"), Some(43_000));
    assert_eq!(extract_mileage_from_title("1988 Audi 90"), None);

    assert_eq!(normalize_make("mercedes benz"), "Mercedes-Benz");
    assert_eq!(normalize_make("Weirdbrand"), "Weirdbrand");

    assert_eq!(normalize_year(&"Model year 1973 special".into()), Some(1973));
    assert_eq!(normalize_year(&3050.into()), None);

    assert_eq!(normalize_torque(&"300 Nm".into()), Some(221));
}

#[test]
fn json_records_normalize_and_stay_stable() {
    let records: Vec<VehicleInput> = serde_json::from_str(
        r#"[
            {"make": "vw", "model": "golf gti", "year": "1984", "mileage": "86,000 miles",
             "transmission": "5 speed manual", "drivetrain": "front wheel drive",
             "engine_size": "1781cc", "price": "$14,250.499"},
            {"make": "porsche", "horsepower": 0, "torque": "5000 lb-ft", "vin": "wp0 ab0 914"}
        ]"#,
    )
    .unwrap();

    let once: Vec<_> = records.iter().map(normalize_vehicle).collect();

    let golf = &once[0];
    assert_eq!(golf.year, Some(1984));
    assert_eq!(golf.mileage, Some(86_000));
    assert_eq!(golf.transmission, Some(Transmission::SpeedManual(5)));
    assert_eq!(golf.engine_size, Some(1.8));
    assert_eq!(golf.price, Some(14_250.5));
    assert_eq!(golf.model.as_deref(), Some("Golf GTI"));

    let porsche = &once[1];
    assert_eq!(porsche.make.as_deref(), Some("Porsche"));
    assert_eq!(porsche.horsepower, None);
    assert_eq!(porsche.torque, None);
    assert_eq!(porsche.vin.as_deref(), Some("WP0AB0914"));
    assert_eq!(porsche.year, None, "absent input stays absent");

    for vehicle in &once {
        assert_eq!(&normalize_vehicle(&VehicleInput::from(vehicle)), vehicle);
    }
}
