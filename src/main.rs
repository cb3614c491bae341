use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, Level};

use qrbar::{
    get, parse_color, BarcodeResult, ColorMap, DataUriOptions, ECLevel, EncodeOptions, Family, Format,
    SaveOptions, SvgOptions,
};

#[derive(Parser)]
#[command(name = "qrbar")]
#[command(about = "Encode QR codes and barcodes as SVG", long_about = None)]
struct Cli {
    /// Barcode family, e.g. qr, micro, code128, ean13
    family: String,
    /// Data to encode
    data: String,
    /// Output file, svg or svgz. Prints to stdout when omitted
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Output format, overrides the file extension
    #[arg(long)]
    kind: Option<String>,
    /// Size of a single module
    #[arg(short, long, default_value_t = 1.0)]
    scale: f64,
    /// Quiet zone in modules, family default when omitted
    #[arg(short, long)]
    border: Option<usize>,
    /// Color of dark modules
    #[arg(long, default_value = "#000")]
    dark: String,
    /// Color of light modules
    #[arg(long, default_value = "transparent")]
    light: String,
    /// Minimum error correction level: L, M, Q or H
    #[arg(short, long)]
    error: Option<ECLevel>,
    /// Encode QR data as Micro QR
    #[arg(long)]
    micro: bool,
    /// QR version
    #[arg(long)]
    version: Option<usize>,
    /// QR mask pattern
    #[arg(long)]
    mask: Option<u8>,
    /// Omit the optional check character
    #[arg(long, conflicts_with = "checksum")]
    no_checksum: bool,
    /// Request a check character
    #[arg(long)]
    checksum: bool,
    /// Print a data URI instead of the SVG document
    #[arg(long, conflicts_with = "output")]
    data_uri: bool,
    /// Document title
    #[arg(long)]
    title: Option<String>,
    /// Increase log verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt().with_max_level(level).with_writer(std::io::stderr).init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> BarcodeResult<()> {
    let mut factory = get(&cli.family)?;
    if cli.micro && factory.family() == Family::Qr {
        factory = get("micro")?;
    }
    let add_checksum = match (cli.checksum, cli.no_checksum) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    };
    let opts = EncodeOptions {
        ec_level: cli.error,
        version: cli.version,
        mask: cli.mask,
        add_checksum,
        ..EncodeOptions::default()
    };
    let symbol = factory.encode(&cli.data, &opts)?;
    debug!("Encoded {:?}", symbol.metadata());

    let colormap = ColorMap::builder().dark(parse_color(&cli.dark)?).light(parse_color(&cli.light)?).build();
    let svg = SvgOptions { scale: cli.scale, border: cli.border, title: cli.title.clone(), ..SvgOptions::default() };

    if cli.data_uri {
        let opts = DataUriOptions {
            svg: SvgOptions { xmldecl: false, nl: false, ..svg },
            colormap,
            ..DataUriOptions::default()
        };
        println!("{}", symbol.as_data_uri(&opts)?);
        return Ok(());
    }

    let opts = SaveOptions { svg, colormap, ..SaveOptions::default() };
    match &cli.output {
        Some(path) => symbol.save(path, cli.kind.as_deref(), &opts),
        None => {
            let format = cli.kind.as_deref().map_or(Ok(Format::Svg), str::parse::<Format>)?;
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            symbol.write_to(&mut out, format, &opts)?;
            out.flush()?;
            Ok(())
        }
    }
}
