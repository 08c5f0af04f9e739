use std::env;
use std::error::Error;

use qrism_core::{encode, select_minimum_version, str_to_bytes, ECLevel, LocationKind};

fn main() -> Result<(), Box<dyn Error>> {
    // Text from the first argument, or a default
    let text = env::args().nth(1).unwrap_or_else(|| "https://gksander.com".to_string());
    let data = str_to_bytes(&text);

    let version = select_minimum_version(&data, ECLevel::M)?;
    let qr = encode(&data, *version, ECLevel::M)?;

    println!("{}", qr.to_str(1));
    println!("QR metadata: {}", qr.metadata());

    // Renderers style the finder and alignment patterns separately from data
    let w = qr.dimension() as i32;
    let patterns = (0..w)
        .flat_map(|y| (0..w).map(move |x| (x, y)))
        .map(|(x, y)| qr.location_type(x, y))
        .filter(|kind| !matches!(kind, LocationKind::Data | LocationKind::Empty))
        .count();
    println!("Dark pattern modules: {patterns}");

    Ok(())
}
