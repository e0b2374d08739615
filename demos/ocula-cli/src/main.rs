use argh::FromArgs;
use std::path::{Path, PathBuf};

use ocula::image::Image;
use ocula::imgproc::{self, filter::Kernel, threshold::HISTOGRAM_LENGTH};
use ocula::io::{
    features as feature_io, functional as F, histogram as histogram_io, mask, shapes, training,
};
use ocula::regions::{
    classifier::classify,
    features::{extract_features, extract_region_features},
    labeling::colorize_regions,
    pipeline::{self, PipelineConfig},
    registry::ClassRegistry,
    Segmentation,
};

#[derive(FromArgs)]
/// Segment, describe and classify the regions of raster images
struct Args {
    /// log every stage at debug level
    #[argh(switch, short = 'v')]
    verbose: bool,

    /// path to a JSON pipeline configuration
    #[argh(option, short = 'c')]
    config: Option<PathBuf>,

    #[argh(subcommand)]
    command: Command,
}

#[derive(FromArgs)]
#[argh(subcommand)]
enum Command {
    Grayscale(GrayscaleArgs),
    Binarize(BinarizeArgs),
    Segment(SegmentArgs),
    Features(FeaturesArgs),
    Learn(LearnArgs),
    Test(TestArgs),
    Draw(DrawArgs),
}

#[derive(FromArgs)]
/// Convert an image to intensity
#[argh(subcommand, name = "grayscale")]
struct GrayscaleArgs {
    /// input image
    #[argh(positional)]
    input: PathBuf,

    /// output image
    #[argh(positional)]
    output: PathBuf,
}

#[derive(FromArgs)]
/// Threshold an image with the k-means cutoff
#[argh(subcommand, name = "binarize")]
struct BinarizeArgs {
    /// input image
    #[argh(positional)]
    input: PathBuf,

    /// output binary image
    #[argh(positional)]
    output: PathBuf,

    /// mask file used to smooth the image first
    #[argh(option, short = 'm')]
    mask: Option<PathBuf>,

    /// write the intensity histogram to this file
    #[argh(option)]
    histogram: Option<PathBuf>,
}

#[derive(FromArgs)]
/// Label the regions of an image and render them
#[argh(subcommand, name = "segment")]
struct SegmentArgs {
    /// input image
    #[argh(positional)]
    input: PathBuf,

    /// output label image
    #[argh(positional)]
    output: PathBuf,

    /// mask file used to smooth the image first
    #[argh(option, short = 'm')]
    mask: Option<PathBuf>,
}

#[derive(FromArgs)]
/// Write the averaged region features of an image
#[argh(subcommand, name = "features")]
struct FeaturesArgs {
    /// input image
    #[argh(positional)]
    input: PathBuf,

    /// output feature file
    #[argh(positional)]
    output: PathBuf,

    /// mask file used to smooth the image first
    #[argh(option, short = 'm')]
    mask: Option<PathBuf>,
}

#[derive(FromArgs)]
/// Learn class prototypes from a training list
#[argh(subcommand, name = "learn")]
struct LearnArgs {
    /// training list
    #[argh(positional)]
    list: PathBuf,

    /// output class file
    #[argh(positional)]
    output: PathBuf,

    /// mask file used to smooth every image first
    #[argh(option, short = 'm')]
    mask: Option<PathBuf>,
}

#[derive(FromArgs)]
/// Classify the regions of an image and outline them
#[argh(subcommand, name = "test")]
struct TestArgs {
    /// input image
    #[argh(positional)]
    input: PathBuf,

    /// learned class file
    #[argh(positional)]
    classes: PathBuf,

    /// output annotated image
    #[argh(positional)]
    output: PathBuf,

    /// mask file used to smooth the image first
    #[argh(option, short = 'm')]
    mask: Option<PathBuf>,
}

#[derive(FromArgs)]
/// Draw the shapes of a script over an image
#[argh(subcommand, name = "draw")]
struct DrawArgs {
    /// input image
    #[argh(positional)]
    input: PathBuf,

    /// shape script
    #[argh(positional)]
    script: PathBuf,

    /// output image
    #[argh(positional)]
    output: PathBuf,

    /// shape color as r,g,b
    #[argh(option, default = "[255, 255, 255]", from_str_fn(parse_color))]
    color: [u8; 3],
}

fn parse_color(value: &str) -> Result<[u8; 3], String> {
    let channels = value
        .split(',')
        .map(|c| c.trim().parse::<u8>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("invalid color '{value}': {e}"))?;
    channels
        .try_into()
        .map_err(|_| format!("expected three channels in '{value}'"))
}

fn load_mask(path: Option<&Path>) -> Result<Option<Kernel>, Box<dyn std::error::Error>> {
    Ok(path.map(mask::read_mask).transpose()?)
}

fn segment_file(
    path: &Path,
    config: &PipelineConfig,
    mask: Option<&Kernel>,
) -> Result<Segmentation, Box<dyn std::error::Error>> {
    let gray = F::read_image_any_mono8(path)?;
    let segmentation = pipeline::segment(&gray, config, mask)?;
    log::info!(
        "{}: {} regions",
        path.display(),
        segmentation.num_regions()
    );
    Ok(segmentation)
}

fn learn(args: &LearnArgs, config: &PipelineConfig) -> Result<(), Box<dyn std::error::Error>> {
    let mask = load_mask(args.mask.as_deref())?;
    let classes = training::read_training_list(&args.list)?;

    let mut registry = ClassRegistry::new();
    for class in classes {
        let index = registry.insert(class.name)?;
        for file in class.files {
            let seg = segment_file(&file, config, mask.as_ref())?;
            registry.update_class(index, &seg.labels, &seg.regions)?;
            registry.add_file(index, file)?;
        }
    }

    feature_io::write_class_features(&args.output, &registry)?;
    log::info!(
        "learned {} classes into {}",
        registry.len(),
        args.output.display()
    );
    Ok(())
}

fn classify_image(
    args: &TestArgs,
    config: &PipelineConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mask = load_mask(args.mask.as_deref())?;
    let registry = feature_io::read_class_features(&args.classes)?;

    let gray = F::read_image_any_mono8(&args.input)?;
    let seg = pipeline::segment(&gray, config, mask.as_ref())?;
    let features = extract_region_features(&seg.labels, &seg.regions);
    let annotations = classify(
        &seg.regions,
        &features,
        &registry,
        &config.classifier,
        &config.palette,
    )?;

    let mut rgb = Image::<u8, 3>::from_size_val(gray.size(), 0)?;
    imgproc::color::rgb_from_gray_u8(&gray, &mut rgb)?;

    for annotation in &annotations {
        let name = annotation
            .class_index
            .and_then(|i| registry.get(i))
            .map_or("unknown", |c| c.name.as_str());
        let bbox = annotation.bbox;
        println!(
            "region {} at ({}, {}) {}x{}: {name}",
            annotation.region, bbox.row, bbox.col, bbox.width, bbox.height
        );
        if let Some(color) = annotation.color {
            imgproc::draw::draw_box(&mut rgb, bbox.row, bbox.col, bbox.width, bbox.height, color);
        }
    }

    F::write_image(&args.output, &rgb)?;
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Args = argh::from_env();

    let level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let config = match &args.config {
        Some(path) => PipelineConfig::from_json_file(path)?,
        None => PipelineConfig::default(),
    };

    match args.command {
        Command::Grayscale(args) => {
            let gray = F::read_image_any_mono8(&args.input)?;
            F::write_image(&args.output, &gray)?;
        }
        Command::Binarize(args) => {
            let mask = load_mask(args.mask.as_deref())?;
            let mut gray = F::read_image_any_mono8(&args.input)?;
            if let Some(mask) = &mask {
                gray = pipeline::smooth(&gray, mask)?;
            }
            if let Some(path) = &args.histogram {
                let mut hist = vec![0usize; HISTOGRAM_LENGTH];
                imgproc::histogram::compute_histogram(&gray, &mut hist, HISTOGRAM_LENGTH)?;
                histogram_io::write_histogram(path, &hist)?;
            }
            let (binary, threshold) = pipeline::binarize(&gray, &config)?;
            println!("threshold: {threshold}");
            F::write_image(&args.output, &binary)?;
        }
        Command::Segment(args) => {
            let mask = load_mask(args.mask.as_deref())?;
            let seg = segment_file(&args.input, &config, mask.as_ref())?;
            let rendered = colorize_regions(&seg, &config.colorize)?;
            F::write_image(&args.output, &rendered)?;
        }
        Command::Features(args) => {
            let mask = load_mask(args.mask.as_deref())?;
            let seg = segment_file(&args.input, &config, mask.as_ref())?;
            let features = extract_features(&seg.labels, &seg.regions)?;
            // class names are single tokens
            let name = args
                .input
                .file_stem()
                .map_or_else(|| "image".to_string(), |s| s.to_string_lossy().into_owned())
                .replace(char::is_whitespace, "_");
            feature_io::write_image_features(&args.output, &name, &features)?;
        }
        Command::Learn(args) => learn(&args, &config)?,
        Command::Test(args) => classify_image(&args, &config)?,
        Command::Draw(args) => {
            let script = shapes::read_shapes(&args.script)?;
            let mut rgb = F::read_image_any_rgb8(&args.input)?;
            for shape in &script {
                imgproc::draw::draw_shape(&mut rgb, shape, args.color)?;
            }
            F::write_image(&args.output, &rgb)?;
        }
    }

    Ok(())
}
