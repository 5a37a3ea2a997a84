//! Balafon - A virtual percussion instrument
//!
//! Strike the bars from the keyboard, record a take, and look at the
//! spectrum of any tone.

use std::error::Error;
use std::thread;
use std::time::Duration;

use clap::Parser;

use balafon::audio::{analyze, PlaybackEvent, Take};
use balafon::cli::{parse_keys, parse_pitch, Args, Command};
use balafon::keymap;
use balafon::scale::{Scale, ScaleKind};
use balafon::store::{JsonFileStore, MetadataStore};
use balafon::Engine;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = args.engine_config()?;

    match &args.command {
        Command::Scale { name, count } => {
            let kind = ScaleKind::from_name(name);
            let count = count.unwrap_or(config.scale.pitch_count);
            let scale = Scale::build(kind, count, config.scale.base_octave);

            println!("Scale: {} ({} bars)", kind, scale.len());
            for (index, pitch) in scale.pitches().iter().enumerate() {
                let key = keymap::key_for(index)
                    .map(String::from)
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "  {:>2}  {:<4} {:>9.2} Hz   key {}",
                    index,
                    pitch.to_string(),
                    pitch.frequency(),
                    key
                );
            }
        }

        Command::Render {
            note,
            octave,
            duration,
            no_harmonics,
            output,
        } => {
            let engine = Engine::new(config)?;
            let pitch = parse_pitch(note, *octave);
            let synth = engine.cache().synthesizer();
            let duration = duration.unwrap_or(synth.config().default_duration_s);
            if !(duration > 0.0) {
                return Err(format!("duration must be > 0, got {}", duration).into());
            }

            let tone = synth.render(pitch.frequency(), duration, !no_harmonics);
            let mut take = Take::new();
            take.append(&tone);
            engine.save_take(&take, output)?;

            println!(
                "Rendered {} ({:.2} Hz, {:.3}s, {} samples) to {}",
                pitch,
                pitch.frequency(),
                tone.duration_secs(),
                tone.len(),
                output.display()
            );
        }

        Command::Spectrum {
            note,
            octave,
            ceiling,
            top,
        } => {
            let engine = Engine::new(config)?;
            let pitch = parse_pitch(note, *octave);
            let ceiling = ceiling.unwrap_or(engine.config().spectrum.ceiling_hz);

            let tone = engine.cache().get_or_render(pitch.frequency());
            let view = analyze(&tone, tone.sample_rate(), ceiling);

            println!(
                "Spectrum of {} ({:.2} Hz), {} bins up to {} Hz",
                pitch,
                pitch.frequency(),
                view.len(),
                ceiling
            );
            for (freq, magnitude) in view.strongest(*top) {
                let bar = "#".repeat((magnitude * 40.0).round() as usize);
                println!("  {:>8.1} Hz  {:.3}  {}", freq, magnitude, bar);
            }
        }

        Command::Play {
            keys,
            scale,
            interval_ms,
            record,
            user,
        } => {
            let ring_out = Duration::from_secs_f64(config.synth.default_duration_s);
            let engine = Engine::detect(config)?;
            if !engine.has_playback() {
                println!("No output device: playing silently");
            }
            if let Some(name) = scale {
                engine.set_scale(name);
            }
            println!("Scale: {}", engine.scale_kind());

            if *record {
                engine.start_recording();
            }

            for slot in parse_keys(keys) {
                match slot.and_then(|index| engine.strike(index).map(|_| index)) {
                    Some(index) => {
                        if let Some(pitch) = engine.pitch(index) {
                            println!("  Playing {} ({:.1} Hz)", pitch, pitch.frequency());
                        }
                    }
                    None => println!("  Rest"),
                }
                thread::sleep(Duration::from_millis(*interval_ms));
            }

            // Let the last note ring out
            thread::sleep(ring_out);

            if let Some(events) = engine.playback_events() {
                for event in events.try_iter() {
                    match event {
                        PlaybackEvent::Failed { error, .. } => {
                            eprintln!("Playback error: {}", error)
                        }
                        PlaybackEvent::Dropped { .. } => {
                            eprintln!("A note was dropped (too many at once)")
                        }
                    }
                }
            }

            if *record {
                match engine.finish_recording(user) {
                    Ok(saved) => {
                        let filename = saved.path.display().to_string();
                        let store = JsonFileStore::new(&args.store);
                        store.record(user, &filename, saved.duration_secs)?;
                        println!(
                            "Saved {} notes ({:.2}s) to {}",
                            saved.notes, saved.duration_secs, filename
                        );
                    }
                    Err(e) => eprintln!("Could not save recording: {}", e),
                }
            }
        }

        Command::Recordings { user } => {
            let store = JsonFileStore::new(&args.store);
            let rows = store.list(user)?;
            if rows.is_empty() {
                println!("No recordings for {}", user);
            }
            for row in rows {
                println!(
                    "{} - {:.2}s - {}",
                    row.filename,
                    row.duration_secs,
                    row.created_at.format("%Y-%m-%d %H:%M:%S")
                );
            }
        }
    }

    Ok(())
}
