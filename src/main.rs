//! statforge command-line front end.
//!
//! Usage:
//!   statforge [--config FILE] [--data-dir DIR] [--json] <COMMAND>
//!
//! Examples:
//!   statforge create Aria --level 10 --curve power
//!   statforge project Aria --max-level 50
//!   statforge duel Aria 2 --seed 42
//!   statforge series Aria Bran --runs 500 --seed 7 --save

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use serde_json::Value;
use statforge::build_info;
use statforge::character::{
    AttrCurveOverride, AttributeResolver, Attributes, CharacterField, CharacterManager,
    CharacterRecord, CharacterRef, GrowthTemplate,
};
use statforge::core::ForgeConfig;
use statforge::curves::{self, CurveType};
use statforge::simulator::{self, SimConfig};
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "statforge", version = build_info::BUILD_VERSION)]
#[command(about = "Author RPG stat sheets, project growth curves and simulate duels")]
struct Cli {
    /// TOML config file (defaults are used when omitted)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Roster directory, overriding the config and platform default
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

/// Growth options shared by create, generate and set.
#[derive(clap::Args, Debug, Default)]
struct GrowthArgs {
    /// Default growth curve type
    #[arg(long)]
    curve: Option<String>,

    /// Curve parameter for an attribute, as attr.key=value
    #[arg(long = "param", value_parser = parse_param)]
    params: Vec<(String, String, f64)>,

    /// Per-attribute curve override, as attr=curve
    #[arg(long = "attr-curve", value_parser = parse_attr_curve)]
    attr_curves: Vec<(String, String)>,
}

impl GrowthArgs {
    fn template(&self, level: u32) -> GrowthTemplate {
        let mut template = GrowthTemplate::at_level(level);
        if let Some(curve) = &self.curve {
            template.curve_type = curve.clone();
        }
        template.curve_params = self.param_bags();
        for (attribute, curve) in &self.attr_curves {
            template
                .attr_growth_curves
                .insert(attribute.clone(), AttrCurveOverride::new(curve.clone(), None));
        }
        template
    }

    fn param_bags(&self) -> BTreeMap<String, curves::ParamBag> {
        let mut bags: BTreeMap<String, curves::ParamBag> = BTreeMap::new();
        for (attribute, key, value) in &self.params {
            bags.entry(attribute.clone())
                .or_default()
                .insert(key.clone(), Value::from(*value));
        }
        bags
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a character seeded with catalog defaults
    Create {
        name: String,
        #[arg(long, default_value_t = 1)]
        level: u32,
        /// Attribute value, as attr=value
        #[arg(long = "set", value_parser = parse_key_value)]
        values: Vec<(String, f64)>,
        /// Project attributes from the growth curves after creating
        #[arg(long)]
        recalc: bool,
        #[command(flatten)]
        growth: GrowthArgs,
    },
    /// Generate random characters around their curve projections
    Generate {
        /// Name (random when omitted; used as prefix with --count)
        name: Option<String>,
        #[arg(long, default_value_t = 1)]
        level: u32,
        /// Generate a batch, one level apart
        #[arg(long)]
        count: Option<u32>,
        #[arg(long)]
        seed: Option<u64>,
        #[command(flatten)]
        growth: GrowthArgs,
    },
    /// List stored characters
    List {
        /// Case-insensitive name filter
        search: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: usize,
        #[arg(long, default_value_t = 20)]
        page_size: usize,
    },
    /// Show one character
    Show { character: CharacterRef },
    /// Edit attributes or growth settings
    Set {
        character: CharacterRef,
        /// Attribute values, as attr=value
        #[arg(value_parser = parse_key_value)]
        values: Vec<(String, f64)>,
        #[arg(long)]
        rename: Option<String>,
        /// Remove per-attribute curve overrides
        #[arg(long = "clear-attr-curve")]
        clear_attr_curves: Vec<String>,
        #[command(flatten)]
        growth: GrowthArgs,
    },
    /// Change a character's level
    Level {
        character: CharacterRef,
        level: u32,
        /// Recalculate attributes for the new level
        #[arg(long)]
        recalc: bool,
    },
    /// Overwrite attributes with their projection at the current level
    Recalc { character: CharacterRef },
    /// Delete a character by id
    Delete { id: u32 },
    /// Project attribute values over a level range
    Project {
        character: CharacterRef,
        #[arg(long, default_value_t = 100)]
        max_level: u32,
    },
    /// Solve curve parameters through two (level, value) points
    Calibrate {
        curve: CurveType,
        level1: f64,
        value1: f64,
        level2: f64,
        value2: f64,
    },
    /// Sample independent attacks from one character against another
    Exchanges {
        attacker: CharacterRef,
        defender: CharacterRef,
        #[arg(long)]
        samples: Option<u32>,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Fight two characters to the death
    Duel {
        attacker: CharacterRef,
        defender: CharacterRef,
        #[arg(long)]
        max_rounds: Option<u32>,
        #[arg(long)]
        seed: Option<u64>,
        /// Save the full result as JSON in the current directory
        #[arg(long)]
        save: bool,
    },
    /// Run many seeded duels and report win rates
    Series {
        attacker: CharacterRef,
        defender: CharacterRef,
        #[arg(long)]
        runs: Option<u32>,
        #[arg(long)]
        max_rounds: Option<u32>,
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long)]
        save: bool,
    },
}

fn parse_key_value(s: &str) -> std::result::Result<(String, f64), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got '{s}'"))?;
    let value: f64 = value
        .trim()
        .parse()
        .map_err(|_| format!("'{value}' is not a number"))?;
    Ok((key.trim().to_string(), value))
}

fn parse_param(s: &str) -> std::result::Result<(String, String, f64), String> {
    let (path, value) = parse_key_value(s)?;
    let (attribute, key) = path
        .split_once('.')
        .ok_or_else(|| format!("expected attr.key=value, got '{s}'"))?;
    Ok((attribute.to_string(), key.to_string(), value))
}

fn parse_attr_curve(s: &str) -> std::result::Result<(String, String), String> {
    let (attribute, curve) = s
        .split_once('=')
        .ok_or_else(|| format!("expected attr=curve, got '{s}'"))?;
    Ok((attribute.trim().to_string(), curve.trim().to_string()))
}

fn make_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    }
}

fn print_json(value: &impl Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn save_report(prefix: &str, value: &impl Serialize) -> Result<()> {
    let filename = format!(
        "{prefix}_{}.json",
        chrono::Utc::now().format("%Y%m%d_%H%M%S")
    );
    std::fs::write(&filename, serde_json::to_string_pretty(value)?)
        .with_context(|| format!("failed to write {filename}"))?;
    println!("JSON report saved to: {filename}");
    Ok(())
}

fn render_record(record: &CharacterRecord, config: &ForgeConfig) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "#{} {}  (level {}, {} growth)\n",
        record.id(),
        record.name(),
        record.level(),
        record.growth_curve_type()
    ));
    for (name, value) in record.attributes().iter() {
        let curve = record
            .curve_override(name)
            .and_then(|o| o.curve_type.as_deref())
            .map(|c| format!("  [{c}]"))
            .unwrap_or_default();
        out.push_str(&format!(
            "  {:<18} {:>10.1}{}\n",
            config.display_name(name),
            value,
            curve
        ));
    }
    out
}

fn show(record: &CharacterRecord, cli: &Cli, config: &ForgeConfig) -> Result<()> {
    if cli.json {
        print_json(record)
    } else {
        print!("{}", render_record(record, config));
        Ok(())
    }
}

fn load_config(cli: &Cli) -> Result<ForgeConfig> {
    let mut config = match &cli.config {
        Some(path) => ForgeConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => ForgeConfig::default(),
    };
    if let Some(dir) = &cli.data_dir {
        config.data_dir = Some(dir.clone());
    }
    Ok(config)
}

fn run(cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;
    let manager = CharacterManager::new(&config).context("failed to open roster")?;
    let resolver = AttributeResolver::new(&config.growth);
    let sim_defaults = SimConfig::from_config(&config);

    match &cli.command {
        Command::Create {
            name,
            level,
            values,
            recalc,
            growth,
        } => {
            let attrs: Attributes = values.iter().map(|(k, v)| (k.clone(), *v)).collect();
            let mut record =
                manager.create(name, &growth.template(*level), &attrs, &config.attributes)?;
            if *recalc {
                resolver.recalculate_attributes(&mut record)?;
                manager.save(&record)?;
            }
            show(&record, cli, &config)
        }
        Command::Generate {
            name,
            level,
            count,
            seed,
            growth,
        } => {
            let mut rng = make_rng(*seed);
            let template = growth.template(*level);
            match count {
                Some(count) => {
                    let prefix = name.as_deref().unwrap_or("Random");
                    let batch =
                        manager.generate_batch(*count, prefix, &template, &config, &mut rng)?;
                    if cli.json {
                        return print_json(&batch);
                    }
                    for record in &batch {
                        print!("{}", render_record(record, &config));
                    }
                    println!("Generated {} characters", batch.len());
                    Ok(())
                }
                None => {
                    let (record, _) =
                        manager.generate(name.as_deref(), &template, &config, &mut rng)?;
                    show(&record, cli, &config)
                }
            }
        }
        Command::List {
            search,
            page,
            page_size,
        } => {
            let page = manager.find_page(search.as_deref(), *page, *page_size)?;
            if cli.json {
                return print_json(&page);
            }
            println!("  ID   Name                              Level  Curve");
            println!("  ──   ────                              ─────  ─────");
            for record in &page.items {
                println!(
                    "  {:<4} {:<33} {:>5}  {}",
                    record.id(),
                    record.name(),
                    record.level(),
                    record.growth_curve_type()
                );
            }
            println!(
                "Page {}/{} ({} characters)",
                page.page, page.total_pages, page.total
            );
            Ok(())
        }
        Command::Show { character } => {
            let record = manager.load(character)?;
            show(&record, cli, &config)
        }
        Command::Set {
            character,
            values,
            rename,
            clear_attr_curves,
            growth,
        } => {
            let record = manager.update(character, |record| {
                if let Some(name) = rename {
                    record.set_field(CharacterField::Name(name.clone()))?;
                }
                for (name, value) in values {
                    record.set_attribute(name.clone(), *value)?;
                }
                if let Some(curve) = &growth.curve {
                    record.set_field(CharacterField::GrowthCurveType(curve.clone()))?;
                }
                for (attribute, params) in growth.param_bags() {
                    record.set_field(CharacterField::GrowthCurveParams { attribute, params })?;
                }
                for (attribute, curve) in &growth.attr_curves {
                    record.set_field(CharacterField::AttrGrowthCurve {
                        attribute: attribute.clone(),
                        curve: Some(AttrCurveOverride::new(curve.clone(), None)),
                    })?;
                }
                for attribute in clear_attr_curves {
                    record.set_field(CharacterField::AttrGrowthCurve {
                        attribute: attribute.clone(),
                        curve: None,
                    })?;
                }
                Ok(())
            })?;
            show(&record, cli, &config)
        }
        Command::Level {
            character,
            level,
            recalc,
        } => {
            let record = manager.update(character, |record| {
                record.set_field(CharacterField::Level(*level))?;
                if *recalc {
                    resolver.recalculate_attributes(record)?;
                }
                Ok(())
            })?;
            show(&record, cli, &config)
        }
        Command::Recalc { character } => {
            let record = manager.update(character, |record| {
                resolver.recalculate_attributes(record).map(|_| ())
            })?;
            show(&record, cli, &config)
        }
        Command::Delete { id } => {
            manager.delete(*id)?;
            println!("Deleted character #{id}");
            Ok(())
        }
        Command::Project {
            character,
            max_level,
        } => {
            let record = manager.load(character)?;
            let table = resolver.project_range(&record, *max_level)?;
            if cli.json {
                print_json(&table)
            } else {
                print!("{}", table.to_text());
                Ok(())
            }
        }
        Command::Calibrate {
            curve,
            level1,
            value1,
            level2,
            value2,
        } => {
            let calibration = curves::solve(*curve, (*level1, *value1), (*level2, *value2))?;
            if cli.json {
                return print_json(&calibration);
            }
            println!("{}", calibration.formula);
            println!("  params:     {}", serde_json::to_string(&calibration.params)?);
            println!("  base value: {}", calibration.base_value);
            if !calibration.closed_form {
                println!("  (approximate fit)");
            }
            Ok(())
        }
        Command::Exchanges {
            attacker,
            defender,
            samples,
            seed,
        } => {
            let sim = SimConfig {
                exchange_samples: samples.unwrap_or(sim_defaults.exchange_samples),
                ..sim_defaults
            };
            let mut rng = make_rng(*seed);
            let report =
                simulator::run_stored_exchanges(&manager, attacker, defender, &sim, &mut rng)?;
            if cli.json {
                print_json(&report)
            } else {
                print!("{}", report.to_text());
                Ok(())
            }
        }
        Command::Duel {
            attacker,
            defender,
            max_rounds,
            seed,
            save,
        } => {
            let sim = SimConfig {
                max_rounds: max_rounds.unwrap_or(sim_defaults.max_rounds),
                ..sim_defaults
            };
            let mut rng = make_rng(*seed);
            let result = simulator::run_stored_duel(&manager, attacker, defender, &sim, &mut rng)?;
            if cli.json {
                print_json(&result)?;
            } else {
                print!("{}", result.to_text());
            }
            if *save {
                save_report("duel", &result)?;
            }
            Ok(())
        }
        Command::Series {
            attacker,
            defender,
            runs,
            max_rounds,
            seed,
            save,
        } => {
            let sim = SimConfig {
                num_runs: runs.unwrap_or(sim_defaults.num_runs),
                max_rounds: max_rounds.unwrap_or(sim_defaults.max_rounds),
                seed: *seed,
                ..sim_defaults
            };
            let report = simulator::run_stored_series(&manager, attacker, defender, &sim)?;
            if cli.json {
                print_json(&report)?;
            } else {
                print!("{}", report.to_text());
            }
            if *save {
                save_report("series", &report)?;
            }
            Ok(())
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    run(&cli)
}
