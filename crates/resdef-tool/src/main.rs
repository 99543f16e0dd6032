mod cli;

use std::fs;

use anyhow::{bail, Context, Result};
use clap::Parser;
use resdef_engine::logging::{init_logging, LoggingConfig};
use resdef_engine::render::HeadlessBackend;
use resdef_engine::resdef::DefKind;
use resdef_engine::vfs::DirVfs;
use resdef_engine::{Resources, ResourcesConfig};
use resdef_syntax::{hash32, hash64, DEFAULT_SEED};

use cli::{Cli, Command, LoadArgs};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(match &cli.log {
        Some(filter) => LoggingConfig::with_filter(filter.clone()),
        None => LoggingConfig::default(),
    });

    match &cli.command {
        Command::Hash { words, seed } => {
            hash_words(words, seed.unwrap_or(DEFAULT_SEED));
            Ok(())
        }
        Command::Scan => scan(&open(&cli)?),
        Command::Load(args) => load(&open(&cli)?, args),
    }
}

fn resources_config(cli: &Cli) -> Result<ResourcesConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
            ResourcesConfig::from_json(&text).with_context(|| format!("parsing {}", path.display()))?
        }
        None => ResourcesConfig::default(),
    };
    if let Some(defs) = &cli.defs {
        config.defs_dir = defs.clone();
    }
    if let Some(fonts) = &cli.fonts {
        config.fonts_dir = fonts.clone();
    }
    Ok(config)
}

fn open(cli: &Cli) -> Result<Resources> {
    if !cli.root.is_dir() {
        bail!("data root {} is not a directory", cli.root.display());
    }
    let config = resources_config(cli)?;
    log::info!("indexing {} (defs '{}', fonts '{}')", cli.root.display(), config.defs_dir, config.fonts_dir);

    let res = Resources::new(DirVfs::new(&cli.root), HeadlessBackend::new(), config);
    res.prepare_resources();
    Ok(res)
}

// ── Commands ──────────────────────────────────────────────────────────────

fn hash_words(words: &[String], seed: u32) {
    for word in words {
        let bytes = word.as_bytes();
        println!("{word:<24} 0x{:08x}  0x{:016x}", hash32(bytes, seed), hash64(bytes, seed));
    }
}

fn scan(res: &Resources) -> Result<()> {
    for loc in res.locations() {
        println!("{:<6} {:<32} {}:{}", loc.kind.keyword(), loc.name, loc.file, loc.pos);
    }
    for font in res.font_names() {
        println!("{:<6} {font}", "font");
    }
    Ok(())
}

fn load(res: &Resources, args: &LoadArgs) -> Result<()> {
    let mut materials = args.materials.clone();
    let mut programs = args.programs.clone();
    let mut fonts = args.fonts.clone();
    if args.all {
        for loc in res.locations() {
            match loc.kind {
                DefKind::Material => materials.push(loc.name.to_string()),
                DefKind::Shader => programs.push(loc.name.to_string()),
            }
        }
        fonts.extend(res.font_names());
    }

    let mut failed = 0usize;

    for name in &materials {
        match res.try_load_material(name) {
            Ok(handle) => {
                let passes = res.with_material(handle, |m| m.num_passes()).unwrap_or(0);
                println!("ok     material {name} ({passes} passes)");
            }
            Err(err) => {
                println!("FAILED material {name}: {err}");
                failed += 1;
            }
        }
    }

    for name in &programs {
        match res.try_load_program(name) {
            Ok(handle) => {
                let (linked, log) = res
                    .with_program(handle, |p| (p.is_linked(), p.error_string().to_string()))
                    .unwrap_or_default();
                if linked {
                    println!("ok     program {name}");
                } else {
                    println!("FAILED program {name}: {log}");
                    failed += 1;
                }
            }
            Err(err) => {
                println!("FAILED program {name}: {err}");
                failed += 1;
            }
        }
    }

    for name in &fonts {
        match res.try_load_font(name) {
            Ok(handle) => {
                let (glyphs, pages) = res.with_font(handle, |f| (f.num_glyphs(), f.num_pages())).unwrap_or_default();
                println!("ok     font {name} ({glyphs} glyphs, {pages} pages)");
            }
            Err(err) => {
                println!("FAILED font {name}: {err}");
                failed += 1;
            }
        }
    }

    log::debug!("{} resources live after load", res.live_resources());
    res.release_all();

    if failed > 0 {
        bail!("{failed} of {} resources failed to load", materials.len() + programs.len() + fonts.len());
    }
    Ok(())
}
