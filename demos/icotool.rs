use clap::{App, Arg, SubCommand};
use std::fs;
use std::path::PathBuf;

//===========================================================================//

fn main() {
    let matches = App::new("icotool")
        .version("0.1")
        .about("Manipulates BMP-based ICO and CUR files")
        .subcommand(
            SubCommand::with_name("create")
                .about("Creates an ICO or CUR file from PNG files")
                .arg(
                    Arg::with_name("output")
                        .takes_value(true)
                        .value_name("PATH")
                        .short("o")
                        .long("output")
                        .help("Sets output path"),
                )
                .arg(
                    Arg::with_name("hotspot")
                        .takes_value(true)
                        .value_name("X,Y")
                        .multiple(true)
                        .number_of_values(1)
                        .long("hotspot")
                        .help("Writes a cursor, with one hotspot per image"),
                )
                .arg(Arg::with_name("image").multiple(true).required(true)),
        )
        .subcommand(
            SubCommand::with_name("extract")
                .about("Extracts an image from an ICO or CUR file as PNG")
                .arg(
                    Arg::with_name("output")
                        .takes_value(true)
                        .value_name("PATH")
                        .short("o")
                        .long("output")
                        .help("Sets output path"),
                )
                .arg(Arg::with_name("ico").required(true))
                .arg(
                    Arg::with_name("index")
                        .help("Entry to extract (defaults to the largest)"),
                ),
        )
        .subcommand(
            SubCommand::with_name("list")
                .about("Lists the entries in an ICO or CUR file")
                .arg(Arg::with_name("ico").required(true)),
        )
        .get_matches();
    if let Some(submatches) = matches.subcommand_matches("create") {
        let mut images = Vec::new();
        for path in submatches.values_of("image").unwrap() {
            println!("Adding {:?}", path);
            let file = fs::File::open(path).unwrap();
            images.push(icocur::RasterImage::read_png(file).unwrap());
        }
        let (icondir, extension) = match submatches.values_of("hotspot") {
            Some(pairs) => {
                let mut hotspots = Vec::<u16>::new();
                for pair in pairs {
                    for coord in pair.split(',') {
                        hotspots.push(coord.trim().parse().unwrap());
                    }
                }
                let icondir =
                    icocur::build_cursor_metadata(&images, &hotspots).unwrap();
                (icondir, "cur")
            }
            None => (icocur::build_icon_metadata(&images).unwrap(), "ico"),
        };
        let out_path = if let Some(path) = submatches.value_of("output") {
            PathBuf::from(path)
        } else {
            let mut path = PathBuf::from(format!("out.{}", extension));
            let mut index: i32 = 0;
            while path.exists() {
                index += 1;
                path = PathBuf::from(format!("out{}.{}", index, extension));
            }
            path
        };
        let out_file = fs::File::create(out_path).unwrap();
        icocur::encode(out_file, &icondir, &images).unwrap();
    } else if let Some(submatches) = matches.subcommand_matches("extract") {
        let path = submatches.value_of("ico").unwrap();
        let file = fs::File::open(path).unwrap();
        let (icondir, images) = icocur::decode(file).unwrap();
        let index = match submatches.value_of("index") {
            Some(index) => index.parse::<usize>().unwrap(),
            None => icondir.largest_index(),
        };
        let out_path = if let Some(path) = submatches.value_of("output") {
            PathBuf::from(path)
        } else {
            PathBuf::from(format!("{}.{}.png", path, index))
        };
        let out_file = fs::File::create(out_path).unwrap();
        images[index].write_png(out_file).unwrap();
    } else if let Some(submatches) = matches.subcommand_matches("list") {
        let path = submatches.value_of("ico").unwrap();
        let file = fs::File::open(path).unwrap();
        let icondir = icocur::decode_metadata(file).unwrap();
        println!("Resource type: {:?}", icondir.resource_type());
        for (index, entry) in icondir.entries().iter().enumerate() {
            let suffix = match entry.fields() {
                icocur::EntryFields::Icon { bits_per_pixel, .. } => {
                    format!("{} bpp", bits_per_pixel)
                }
                icocur::EntryFields::Cursor { hotspot_x, hotspot_y } => {
                    format!("hotspot at ({}, {})", hotspot_x, hotspot_y)
                }
            };
            let marker =
                if index == icondir.largest_index() { " (largest)" } else { "" };
            println!(
                "{:5}: {}x{}, {}, {} bytes{}",
                index,
                entry.width(),
                entry.height(),
                suffix,
                entry.payload_size(),
                marker
            );
        }
    }
}

//===========================================================================//
