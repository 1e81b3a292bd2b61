use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use serde_json::json;
use tracing::{info, info_span};

use foodscan_acquisition::{ImageSource, Scanner};
use foodscan_cli::app::{App, ScanOutcome};
use foodscan_cli::camera::V4l2Camera;
use foodscan_cli::render::{form_table, product_text, symbology_table};
use foodscan_cli::settings::{Settings, installation_id_path, settings_path};
use foodscan_cli::zbar::ZbarDecoder;
use foodscan_lookup::{
    ContributionClient, FormField, InstallationId, LookupWorkflow, OpenFoodFactsClient,
    form_fields, submit_contribution,
};
use foodscan_model::{ContributionDraft, ImageAttachment, NutritionGrade, TagField};

use crate::cli::{ContributeArgs, LiveArgs};

type CliApp = App<ZbarDecoder, V4l2Camera, OpenFoodFactsClient>;

fn build_app(settings: &Settings, device: Option<&Path>) -> Result<CliApp> {
    let scanner_settings = &settings.scanner;
    let decoder = ZbarDecoder::new(&scanner_settings.zbarimg, &scanner_settings.zbarcam);
    let camera = V4l2Camera::new(device.unwrap_or(scanner_settings.camera_device.as_path()));
    let scanner = Scanner::new(decoder, camera, scanner_settings.decoder_config());
    let client =
        OpenFoodFactsClient::new(settings.lookup.clone()).context("create lookup client")?;
    Ok(App::new(scanner, LookupWorkflow::new(client)))
}

/// Print the outcome; returns whether a product was shown.
fn report(outcome: &ScanOutcome, json_output: bool) -> Result<bool> {
    match outcome {
        ScanOutcome::Found(product) => {
            if json_output {
                println!("{}", serde_json::to_string_pretty(product)?);
            } else {
                println!("{}", product_text(product));
            }
            Ok(true)
        }
        ScanOutcome::Failed {
            barcode,
            message,
            not_found,
        } => {
            if json_output {
                let value = json!({
                    "barcode": barcode.as_ref().map(ToString::to_string),
                    "error": message,
                    "not_found": not_found,
                });
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                eprintln!("{message}");
                if *not_found && let Some(barcode) = barcode {
                    eprintln!("Add it with: foodscan contribute {barcode} --name <NAME> ...");
                }
            }
            Ok(false)
        }
    }
}

pub fn run_lookup(settings: &Settings, barcode: &str, json_output: bool) -> Result<bool> {
    let mut app = build_app(settings, None)?;
    let outcome = app.manual(barcode);
    report(&outcome, json_output)
}

pub fn run_scan(settings: &Settings, image: &Path, json_output: bool) -> Result<bool> {
    if !image.is_file() {
        bail!("image not found: {}", image.display());
    }
    let mut app = build_app(settings, None)?;
    let outcome = app.image(ImageSource::from_path(image));
    report(&outcome, json_output)
}

pub fn run_live(settings: &Settings, args: &LiveArgs, json_output: bool) -> Result<bool> {
    let mut app = build_app(settings, args.device.as_deref())?;
    let timeout = Duration::from_secs(args.timeout.unwrap_or(settings.scanner.live_timeout_secs));
    eprintln!("Point the camera at a barcode...");
    let outcome = app.live(timeout);
    report(&outcome, json_output)
}

pub fn run_symbologies(settings: &Settings, json_output: bool) -> Result<()> {
    let config = settings.scanner.decoder_config();
    if json_output {
        println!("{}", serde_json::to_string_pretty(&config)?);
    } else {
        println!("{}", symbology_table(&config));
    }
    Ok(())
}

fn installation_id(settings: &Settings) -> Result<InstallationId> {
    let path = match &settings.installation_id_file {
        Some(path) => path.clone(),
        None => installation_id_path().ok_or_else(|| anyhow!("could not determine data directory"))?,
    };
    InstallationId::load_or_create(&path)
        .with_context(|| format!("installation id at {}", path.display()))
}

pub fn run_installation_id(settings: &Settings) -> Result<()> {
    println!("{}", installation_id(settings)?);
    Ok(())
}

/// Write `settings` to `explicit` or the default settings path.
///
/// An existing file is kept unless `force` is set.
pub fn run_init_config(settings: &Settings, explicit: Option<&Path>, force: bool) -> Result<()> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => settings_path().ok_or_else(|| anyhow!("could not determine config directory"))?,
    };
    if path.exists() && !force {
        bail!(
            "settings file already exists: {} (use --force to overwrite)",
            path.display()
        );
    }
    settings.save(&path)?;
    println!("{}", path.display());
    Ok(())
}

/// Fill a draft from command-line values.
pub fn build_draft(args: &ContributeArgs) -> Result<ContributionDraft> {
    let code = foodscan_model::Barcode::parse(&args.barcode)
        .ok_or_else(|| anyhow!("barcode must not be empty"))?;
    let mut draft = ContributionDraft::new(code);
    draft.product_name = args.name.trim().to_string();
    draft.creator = args.creator.trim().to_string();

    let tag_inputs = [
        (TagField::Brands, &args.brands),
        (TagField::Categories, &args.categories),
        (TagField::Labels, &args.labels),
        (TagField::Allergens, &args.allergens),
        (TagField::Ingredients, &args.ingredients),
        (TagField::DataSources, &args.data_sources),
    ];
    for (field, values) in tag_inputs {
        for value in values {
            draft.add_tag(field, value);
        }
    }

    for (key, value) in &args.nutrients {
        if !draft.nutrients.set(key, *value) {
            let known = draft
                .nutrients
                .entries()
                .iter()
                .map(|(name, _)| *name)
                .collect::<Vec<_>>()
                .join(", ");
            bail!("unknown nutrient `{key}` (expected one of: {known})");
        }
    }

    draft.flags.is_beverage = args.beverage;
    draft.flags.is_cheese = args.cheese;
    draft.flags.is_fat = args.fat;
    draft.flags.is_water = args.water;
    draft.grade = NutritionGrade::from_optional(args.grade.as_deref());
    draft.score = args.score;

    for path in &args.images {
        let bytes = fs::read(path).with_context(|| format!("read image {}", path.display()))?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let image = ImageAttachment::new(file_name, bytes).map_err(|issue| anyhow!(issue))?;
        draft.attach_image(image);
    }
    Ok(draft)
}

fn fields_json(fields: &[FormField<'_>]) -> serde_json::Value {
    let entries = fields
        .iter()
        .map(|field| match field {
            FormField::Text { name, value } => json!({ "name": name, "value": value }),
            FormField::File { name, image } => json!({
                "file_name": image.file_name,
                "media_type": image.media_type,
                "name": name,
                "size": image.bytes.len(),
            }),
        })
        .collect();
    serde_json::Value::Array(entries)
}

pub fn run_contribute(settings: &Settings, args: &ContributeArgs, json_output: bool) -> Result<()> {
    let span = info_span!("contribute", barcode = %args.barcode);
    let _guard = span.enter();

    let mut draft = build_draft(args)?;
    if let Err(issues) = draft.validate() {
        let listed = issues
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        bail!("contribution is incomplete: {listed}");
    }
    let id = installation_id(settings)?;
    let app = &settings.lookup.app;

    if !args.submit {
        let fields = form_fields(&draft, app, id);
        if json_output {
            println!("{}", serde_json::to_string_pretty(&fields_json(&fields))?);
        } else {
            println!("{}", form_table(&fields));
            eprintln!("Dry run: pass --submit to send this contribution.");
        }
        return Ok(());
    }

    let client = ContributionClient::new(&settings.lookup).context("create contribution client")?;
    let receipt = submit_contribution(&mut draft, &client, app, id)
        .map_err(|err| anyhow!(err.user_message()))?;
    info!(status = ?receipt.status_verbose, "contribution sent");

    let status = receipt
        .status_verbose
        .unwrap_or_else(|| "Product contributed.".to_string());
    if json_output {
        println!("{}", json!({ "status": status }));
    } else {
        println!("{status}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> ContributeArgs {
        ContributeArgs {
            barcode: " 5000112637922 ".to_string(),
            name: "Example Cola".to_string(),
            creator: "tester".to_string(),
            brands: vec!["Cola Co".to_string()],
            nutrients: vec![("sugars".to_string(), 10.6)],
            beverage: true,
            grade: Some("C".to_string()),
            ..ContributeArgs::default()
        }
    }

    #[test]
    fn test_build_draft() {
        let draft = build_draft(&args()).unwrap();
        assert_eq!(draft.code.as_str(), "5000112637922");
        assert_eq!(draft.tags(TagField::Brands), ["en:cola-co".to_string()]);
        assert!((draft.nutrients.sugars - 10.6).abs() < f64::EPSILON);
        assert!(draft.flags.is_beverage);
        assert_eq!(draft.grade, NutritionGrade::C);
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn test_unknown_nutrient_is_rejected() {
        let mut args = args();
        args.nutrients.push(("caffeine".to_string(), 1.0));
        let err = build_draft(&args).unwrap_err();
        assert!(err.to_string().contains("unknown nutrient `caffeine`"));
    }

    #[test]
    fn test_non_image_attachment_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        fs::write(&path, "hello").unwrap();
        let mut args = args();
        args.images.push(path);

        let err = build_draft(&args).unwrap_err();
        assert!(err.to_string().contains("notes.txt"));
    }

    #[test]
    fn test_init_config_writes_loadable_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config").join("settings.toml");

        run_init_config(&Settings::default(), Some(&path), false).unwrap();
        assert_eq!(Settings::load(Some(&path)).unwrap(), Settings::default());

        let err = run_init_config(&Settings::default(), Some(&path), false).unwrap_err();
        assert!(err.to_string().contains("already exists"));

        let mut changed = Settings::default();
        changed.scanner.live_timeout_secs = 5;
        run_init_config(&changed, Some(&path), true).unwrap();
        assert_eq!(Settings::load(Some(&path)).unwrap(), changed);
    }

    #[test]
    fn test_fields_json_describes_images() {
        let image = ImageAttachment::new("front.jpg", vec![1, 2, 3]).unwrap();
        let fields = [FormField::File {
            name: "images[0]".to_string(),
            image: &image,
        }];
        insta::assert_json_snapshot!(fields_json(&fields), @r#"
        [
          {
            "file_name": "front.jpg",
            "media_type": "image/jpeg",
            "name": "images[0]",
            "size": 3
          }
        ]
        "#);
    }
}
