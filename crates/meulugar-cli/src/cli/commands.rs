//! # CLI Layer
//!
//! The only place in the workspace that:
//! - Knows about terminal I/O (stdout, stderr, stdin prompts)
//! - Turns errors into exit codes (via `main`)
//! - Formats output for human consumption
//!
//! ## Responsibilities
//!
//! 1. **Argument Parsing**: shell arguments into typed commands via clap
//! 2. **Context Setup**: configuration, logging and the API facade
//! 3. **Dispatch**: route each command to its handler
//! 4. **Confirmation**: ask before `delete` and `clear`

use super::print;
use super::setup::{
    Cli, Commands, DataCommands, ListArgs, MediaCommands, MiscCommands, PlaceCommands,
    PlaceFields,
};
use anyhow::{anyhow, bail, Context, Result};
use chrono::Local;
use clap::Parser;
use meulugar::codec::export_filename;
use meulugar::config::MeuLugarConfig;
use meulugar::draft::PlaceDraft;
use meulugar::logging::init_logging;
use meulugar::query::{self, PlaceFilter, SortOrder};
use meulugar::store::fs_backend::FsBackend;
use meulugar::store::fs_media::FsMediaStore;
use meulugar::{Emotion, MeuLugarApi, Place};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

type Api = MeuLugarApi<FsBackend, FsMediaStore>;

struct AppContext {
    api: Api,
    config: MeuLugarConfig,
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    let mut config = MeuLugarConfig::load()?;
    if let Some(dir) = &cli.data_dir {
        config.data_dir = Some(dir.clone());
    }

    let level = if cli.verbose {
        "debug"
    } else {
        config.log_level.as_str()
    };
    init_logging(level).map_err(|e| anyhow!(e))?;

    let ctx = AppContext {
        api: MeuLugarApi::open(&config)?,
        config,
    };

    match cli.command {
        Some(Commands::Place(cmd)) => match cmd {
            PlaceCommands::List(args) => handle_list(&ctx, args),
            PlaceCommands::Show { id } => handle_show(&ctx, &id),
            PlaceCommands::Add(fields) => handle_add(&ctx, fields).await,
            PlaceCommands::Edit { id, fields } => handle_edit(&ctx, &id, fields).await,
            PlaceCommands::Delete { id, yes } => handle_delete(&ctx, &id, yes).await,
        },
        Some(Commands::Data(cmd)) => match cmd {
            DataCommands::Export { output } => handle_export(&ctx, output),
            DataCommands::Import { file } => handle_import(&ctx, &file),
            DataCommands::Clear { yes } => handle_clear(&ctx, yes),
            DataCommands::Media { action } => handle_media(&ctx, action).await,
            DataCommands::Sweep => handle_sweep(&ctx).await,
        },
        Some(Commands::Misc(cmd)) => match cmd {
            MiscCommands::Tags => handle_tags(&ctx),
            MiscCommands::Stats => handle_stats(&ctx),
            MiscCommands::Config { template } => handle_config(&ctx, template),
        },
        None => handle_list(&ctx, ListArgs::default()),
    }
}

/// Find a place by full id, else by unique id prefix.
fn resolve_place(ctx: &AppContext, id: &str) -> Result<Place> {
    if let Some(place) = ctx.api.get_place(id) {
        return Ok(place);
    }
    let mut matches: Vec<Place> = ctx
        .api
        .list_places()
        .into_iter()
        .filter(|p| p.id.starts_with(id))
        .collect();
    match matches.len() {
        0 => bail!("No place matches `{}`", id),
        1 => Ok(matches.remove(0)),
        n => bail!("`{}` is ambiguous: {} places match", id, n),
    }
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().read_line(&mut answer)?;
    Ok(matches!(
        answer.trim().to_lowercase().as_str(),
        "y" | "yes" | "s" | "sim"
    ))
}

fn handle_list(ctx: &AppContext, args: ListArgs) -> Result<()> {
    let places = ctx.api.list_places();
    let filter = PlaceFilter {
        emotion: args.emotion,
        tags: args.tags,
        search: args.search,
    };
    let order = if args.asc {
        SortOrder::Asc
    } else {
        SortOrder::Desc
    };
    let shown = query::query(&places, &filter, args.sort.into(), order);
    print::print_places(&shown);
    Ok(())
}

fn handle_show(ctx: &AppContext, id: &str) -> Result<()> {
    let place = resolve_place(ctx, id)?;
    print::print_place(&place);
    Ok(())
}

fn apply_fields(draft: &mut PlaceDraft, fields: PlaceFields) -> Result<()> {
    if let Some(title) = fields.title {
        draft.title = title;
    }
    if let Some(description) = fields.description {
        draft.description = description;
    }
    if let Some(emotion) = fields.emotion {
        draft.emotion = emotion;
    }
    if fields.lat.is_some() {
        draft.lat = fields.lat;
    }
    if fields.lng.is_some() {
        draft.lng = fields.lng;
    }
    for tag in &fields.untags {
        draft.remove_tag(tag.trim());
    }
    for tag in &fields.tags {
        draft.add_tag(tag);
    }
    if let Some(text) = fields.critical {
        draft.critical_characteristics = text;
    }
    if let Some(text) = fields.change {
        draft.what_would_change = text;
    }
    if let Some(text) = fields.perception {
        draft.space_perception = text;
    }
    if let Some(path) = fields.photo {
        draft.photo = Some(read_attachment(&path)?);
    }
    if let Some(path) = fields.audio {
        draft.audio = Some(read_attachment(&path)?);
    }
    Ok(())
}

fn read_attachment(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("could not read {}", path.display()))
}

async fn handle_add(ctx: &AppContext, fields: PlaceFields) -> Result<()> {
    let mut draft = PlaceDraft::new();
    apply_fields(&mut draft, fields)?;

    let mut projection = ctx.api.load_projection();
    let place = ctx.api.submit_place(draft, None, &mut projection).await?;
    print::print_success(&format!("Added \"{}\" ({})", place.title, place.id));
    Ok(())
}

async fn handle_edit(ctx: &AppContext, id: &str, fields: PlaceFields) -> Result<()> {
    let existing = resolve_place(ctx, id)?;
    let mut draft = PlaceDraft::from_place(&existing);
    apply_fields(&mut draft, fields)?;

    let mut projection = ctx.api.load_projection();
    let place = ctx
        .api
        .submit_place(draft, Some(&existing), &mut projection)
        .await?;
    print::print_success(&format!("Updated \"{}\"", place.title));
    Ok(())
}

async fn handle_delete(ctx: &AppContext, id: &str, yes: bool) -> Result<()> {
    let place = resolve_place(ctx, id)?;
    if !yes && !confirm(&format!("Delete \"{}\"?", place.title))? {
        print::print_info("Aborted.");
        return Ok(());
    }

    let mut projection = ctx.api.load_projection();
    if !ctx.api.remove_place(&place.id, &mut projection).await {
        bail!("could not delete \"{}\"", place.title);
    }
    print::print_success(&format!("Deleted \"{}\"", place.title));
    Ok(())
}

fn handle_export(ctx: &AppContext, output: Option<PathBuf>) -> Result<()> {
    let text = ctx.api.export_data()?;
    let Some(path) = output else {
        println!("{}", text);
        return Ok(());
    };

    let path = if path.is_dir() {
        path.join(export_filename(Local::now().date_naive()))
    } else {
        path
    };
    fs::write(&path, text).with_context(|| format!("could not write {}", path.display()))?;
    print::print_success(&format!(
        "Exported {} places to {}",
        ctx.api.list_places().len(),
        path.display()
    ));
    Ok(())
}

fn handle_import(ctx: &AppContext, file: &Path) -> Result<()> {
    let text = fs::read_to_string(file)
        .with_context(|| format!("could not read {}", file.display()))?;
    let summary = ctx
        .api
        .try_import_data(&text)
        .with_context(|| format!("nothing imported from {}", file.display()))?;

    match summary.places {
        Some(count) => print::print_success(&format!("Imported {} places", count)),
        None => print::print_info("Places left unchanged"),
    }
    if summary.portfolio {
        print::print_success("Imported portfolio");
    }
    Ok(())
}

fn handle_clear(ctx: &AppContext, yes: bool) -> Result<()> {
    if !yes && !confirm("Erase every place and the portfolio? This cannot be undone.")? {
        print::print_info("Aborted.");
        return Ok(());
    }
    if !ctx.api.clear_all() {
        bail!("could not clear the journal");
    }
    print::print_success("All places erased");
    Ok(())
}

async fn handle_media(ctx: &AppContext, action: MediaCommands) -> Result<()> {
    match action {
        MediaCommands::Get { key, output } => {
            let data = ctx
                .api
                .get_media(&key)
                .await?
                .ok_or_else(|| anyhow!("No attachment under `{}`", key))?;
            match output {
                Some(path) => {
                    fs::write(&path, &data)
                        .with_context(|| format!("could not write {}", path.display()))?;
                    print::print_success(&format!(
                        "Wrote {} bytes to {}",
                        data.len(),
                        path.display()
                    ));
                }
                None => io::stdout().write_all(&data)?,
            }
        }
        MediaCommands::Put { key, file } => {
            let data = read_attachment(&file)?;
            ctx.api.save_media(&key, &data).await?;
            print::print_success(&format!("Stored {} bytes under {}", data.len(), key));
        }
        MediaCommands::Delete { key } => {
            ctx.api.delete_media(&key).await?;
            print::print_success(&format!("Removed {}", key));
        }
    }
    Ok(())
}

async fn handle_sweep(ctx: &AppContext) -> Result<()> {
    let removed = ctx.api.sweep_orphan_media().await?;
    if removed.is_empty() {
        print::print_info("No orphan attachments");
        return Ok(());
    }
    for key in &removed {
        println!("{}", key);
    }
    print::print_success(&format!("Removed {} orphan attachments", removed.len()));
    Ok(())
}

fn handle_tags(ctx: &AppContext) -> Result<()> {
    let places = ctx.api.list_places();
    let tags: Vec<(String, usize)> = query::all_tags(&places)
        .into_iter()
        .map(|tag| {
            let count = places.iter().filter(|p| p.has_tag(&tag)).count();
            (tag, count)
        })
        .collect();
    print::print_tags(&tags);
    Ok(())
}

fn handle_stats(ctx: &AppContext) -> Result<()> {
    let places = ctx.api.list_places();
    let stats = query::stats(&places);
    let per_emotion: Vec<(Emotion, usize)> = Emotion::ALL
        .into_iter()
        .map(|e| (e, places.iter().filter(|p| p.emotion == e).count()))
        .filter(|(_, count)| *count > 0)
        .collect();
    print::print_stats(&stats, &per_emotion);
    Ok(())
}

fn handle_config(ctx: &AppContext, template: bool) -> Result<()> {
    if template {
        print!("{}", MeuLugarConfig::template());
        return Ok(());
    }
    let data_dir = ctx.config.data_dir()?;
    print::print_config(&ctx.config, &data_dir.display().to_string());
    Ok(())
}
