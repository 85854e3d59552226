//! Seeded QA scenarios driving the core managers through the headless page.

use anyhow::{Result, bail, ensure};
use pitstop_core::config::SECTION_IDS;
use pitstop_core::headless::{CueLog, HeadlessPage, RecordingAudio, ScriptedSpeech};
use pitstop_core::speech::{ALERT_NOTHING_TO_READ, ALERT_SPEECH_FAILED};
use pitstop_core::storage::{FONT_SIZE_KEY, THEME_KEY};
use pitstop_core::{
    Affordance, Cue, CuePlayer, EmojiRecycler, FontConfig, FontScaler, KeyValueStore, MemoryStore,
    NavParams, Navigator, Preferences, ReadAloud, ReadOutcome, SiteConfig, SoundBoard,
    SpeechState, StorageOp, TextBlock, Theme, ThemeManager, UtteranceEvent, UtteranceId,
};
use rand::Rng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha20Rng;
use serde_json::{Value, json};

pub struct ScenarioCtx {
    pub seed: u64,
    pub rng: ChaCha20Rng,
    pub verbose: bool,
}

type ScenarioFn = fn(&mut ScenarioCtx) -> Result<()>;

#[derive(Clone, Copy)]
pub struct Scenario {
    pub key: &'static str,
    pub name: &'static str,
    run: ScenarioFn,
}

impl Scenario {
    /// Run one iteration.
    ///
    /// # Errors
    /// Returns the first violated expectation.
    pub fn run(&self, ctx: &mut ScenarioCtx) -> Result<()> {
        (self.run)(ctx)
    }
}

const CATALOG: &[Scenario] = &[
    Scenario {
        key: "font-bounds",
        name: "Font Size Bounds",
        run: font_bounds,
    },
    Scenario {
        key: "theme-toggle",
        name: "Theme Toggle Round Trip",
        run: theme_toggle,
    },
    Scenario {
        key: "navigation-sweep",
        name: "Single Visible Section Sweep",
        run: navigation_sweep,
    },
    Scenario {
        key: "emoji-cycle",
        name: "Emoji Recycling Without Repeats",
        run: emoji_cycle,
    },
    Scenario {
        key: "read-aloud",
        name: "Read-Aloud State Machine",
        run: read_aloud,
    },
    Scenario {
        key: "preferences",
        name: "Preference Storage Round Trip",
        run: preferences,
    },
    Scenario {
        key: "sound-cues",
        name: "Sound Cue Playback",
        run: sound_cues,
    },
];

pub fn get_scenario(key: &str) -> Option<Scenario> {
    let key = key.to_lowercase();
    CATALOG.iter().find(|scenario| scenario.key == key).copied()
}

pub fn list_scenarios() -> Vec<(&'static str, &'static str)> {
    CATALOG.iter().map(|s| (s.key, s.name)).collect()
}

/// Every scenario key when `all` is requested, otherwise the given keys.
pub fn expand_scenarios(requested: &[String]) -> Vec<String> {
    if requested.iter().any(|s| s == "all") {
        return CATALOG.iter().map(|s| s.key.to_string()).collect();
    }
    requested.to_vec()
}

fn font_bounds(ctx: &mut ScenarioCtx) -> Result<()> {
    let config = FontConfig::default();
    let (store, page) = (MemoryStore::new(), HeadlessPage::new());
    let fonts = FontScaler::new(
        Preferences::new(store.clone()),
        page.clone(),
        CueLog::new(),
        config.clone(),
    );

    let steps = ctx.rng.gen_range(10..40);
    let mut last = 100.0;
    for _ in 0..steps {
        last = if ctx.rng.gen_bool(0.5) {
            fonts.increase()
        } else {
            fonts.decrease()
        };
        ensure!(
            (config.min_percent..=config.max_percent).contains(&last),
            "font size {last}% escaped [{}, {}]",
            config.min_percent,
            config.max_percent
        );
    }
    let saved: Option<f64> = Preferences::new(store.clone()).read(FONT_SIZE_KEY);
    ensure!(saved == Some(last), "persisted {saved:?}, applied {last}");

    for _ in 0..20 {
        last = fonts.increase();
    }
    ensure!(last == config.max_percent, "increases settled at {last}");
    for _ in 0..20 {
        last = fonts.decrease();
    }
    ensure!(last == config.min_percent, "decreases settled at {last}");

    let reloaded = HeadlessPage::new();
    let restored = FontScaler::new(Preferences::new(store), reloaded.clone(), CueLog::new(), config)
        .restore();
    ensure!(restored == Some(last), "restore returned {restored:?}");
    ensure!(
        reloaded.inline_font_percent() == Some(last),
        "restore did not reach the page"
    );
    Ok(())
}

fn theme_toggle(ctx: &mut ScenarioCtx) -> Result<()> {
    let store = MemoryStore::new();
    let prefers_dark = ctx.rng.gen_bool(0.5);
    let saved = match ctx.rng.gen_range(0..3) {
        0 => None,
        1 => Some(Theme::Light),
        _ => Some(Theme::Dark),
    };
    if let Some(theme) = saved {
        Preferences::new(store.clone()).write(THEME_KEY, theme);
    }

    let page = HeadlessPage::new().prefers_dark(prefers_dark);
    let themes = ThemeManager::new(Preferences::new(store.clone()), page.clone());
    let initial = themes.initialize(&page);
    let expected = saved.unwrap_or(if prefers_dark { Theme::Dark } else { Theme::Light });
    ensure!(initial == expected, "resolved {initial}, expected {expected}");

    let flips = ctx.rng.gen_range(1..8);
    for _ in 0..flips {
        themes.toggle();
    }
    let current = page.theme();
    let want = if flips % 2 == 0 { initial } else { initial.toggled() };
    ensure!(current == Some(want), "after {flips} toggles theme is {current:?}");
    ensure!(
        themes.saved() == Some(want),
        "persisted theme {:?} does not match the page",
        themes.saved()
    );
    ensure!(
        page.toggle_icon().as_deref() == Some(want.toggle_icon()),
        "toggle icon out of sync"
    );
    ensure!(
        page.transitions().len() == flips + 1,
        "expected one transition per apply"
    );
    Ok(())
}

fn navigation_sweep(ctx: &mut ScenarioCtx) -> Result<()> {
    let page = HeadlessPage::new().with_sections(SECTION_IDS.iter().copied());
    let mut nav = Navigator::new(&SiteConfig::default(), page.clone(), CueLog::new());
    nav.sync();

    let hops = ctx.rng.gen_range(5..25);
    for hop in 0..hops {
        let before = page.section_states();
        if ctx.rng.gen_ratio(1, 5) {
            let bogus = format!("missing-section-{hop}");
            ensure!(
                nav.show_section(&bogus, NavParams::new()).is_err(),
                "'{bogus}' should not resolve"
            );
            ensure!(page.section_states() == before, "visibility changed for '{bogus}'");
            continue;
        }
        let Some(target) = SECTION_IDS.choose(&mut ctx.rng) else {
            bail!("no sections registered");
        };
        let mut params = NavParams::new();
        params.insert("hop", json!(hop));
        let shown = nav.show_section(target, params.clone())?;
        ensure!(
            page.visible_sections() == vec![(*target).to_string()],
            "expected only '{target}' visible, got {:?}",
            page.visible_sections()
        );
        ensure!(shown.params == params, "params were not forwarded");
        if ctx.verbose {
            println!("    hop {hop}: {target}");
        }
    }
    Ok(())
}

const EMOJI: [&str; 12] = [
    "🚀", "🏁", "🔧", "⚙️", "🛠️", "🏎️", "⏱️", "📋", "🧭", "🎯", "💡", "🔥",
];

fn emoji_cycle(ctx: &mut ScenarioCtx) -> Result<()> {
    let size = ctx.rng.gen_range(1..=EMOJI.len());
    let mut pool: Vec<&str> = EMOJI.to_vec();
    pool.shuffle(&mut ctx.rng);
    pool.truncate(size);
    let mut recycler = EmojiRecycler::new(pool.iter().copied());

    let picks: Vec<String> = (0..size * 4).map(|_| recycler.next(&mut ctx.rng)).collect();
    ensure!(
        picks.iter().all(|pick| pool.contains(&pick.as_str())),
        "picked outside the pool"
    );

    if size <= 5 {
        for (cycle, chunk) in picks.chunks(size).enumerate() {
            let mut sorted: Vec<&String> = chunk.iter().collect();
            sorted.sort();
            sorted.dedup();
            ensure!(sorted.len() == chunk.len(), "cycle {cycle} repeated an emoji: {chunk:?}");
        }
    } else {
        let window = size / 2;
        for (idx, pick) in picks.iter().enumerate().skip(1) {
            let start = idx.saturating_sub(window);
            ensure!(
                !picks[start..idx].contains(pick),
                "pick {idx} ({pick}) repeats within the last {window}"
            );
        }
    }
    Ok(())
}

fn content(ctx: &mut ScenarioCtx) -> Vec<TextBlock> {
    if ctx.rng.gen_ratio(1, 6) {
        return vec![TextBlock {
            visible: false,
            ..TextBlock::visible("P", "oculto")
        }];
    }
    vec![
        TextBlock::visible("H2", "Módulo"),
        TextBlock::visible("P", "Checklist de pit stop"),
    ]
}

fn read_aloud(ctx: &mut ScenarioCtx) -> Result<()> {
    let engine = ScriptedSpeech::new();
    let page = HeadlessPage::new();
    let mut reader = ReadAloud::new(
        Some(engine.clone()),
        page.clone(),
        page.clone(),
        CueLog::new(),
        "pt-BR",
    );

    let mut issued: Vec<UtteranceId> = Vec::new();
    let steps = ctx.rng.gen_range(10..40);
    for step in 0..steps {
        let was_speaking = reader.is_speaking();
        let alerts_before = page.alerts().len();
        match ctx.rng.gen_range(0..5) {
            0 | 1 => {
                let blocks = content(ctx);
                match reader.toggle(&blocks) {
                    ReadOutcome::Queued(id) => {
                        ensure!(!was_speaking, "step {step}: queued while speaking");
                        issued.push(id);
                    }
                    ReadOutcome::Cancelled => {
                        ensure!(was_speaking, "step {step}: cancelled while idle");
                        ensure!(
                            page.affordance() == Some(Affordance::Read),
                            "read affordance not restored"
                        );
                    }
                    ReadOutcome::NothingToRead => {
                        ensure!(
                            page.alerts().last().map(String::as_str) == Some(ALERT_NOTHING_TO_READ),
                            "missing empty-content alert"
                        );
                    }
                    other => bail!("step {step}: unexpected outcome {other:?}"),
                }
            }
            roll => {
                let Some(&id) = issued.choose(&mut ctx.rng) else {
                    continue;
                };
                let event = match roll {
                    2 => UtteranceEvent::Started,
                    3 => UtteranceEvent::Ended,
                    _ if ctx.rng.gen_bool(0.5) => UtteranceEvent::Failed("interrupted".into()),
                    _ => UtteranceEvent::Failed("synthesis-failed".into()),
                };
                let live = matches!(
                    reader.state(),
                    SpeechState::Queued(cur) | SpeechState::Speaking(cur) if cur == id
                );
                let reports = matches!(
                    &event,
                    UtteranceEvent::Failed(code) if code == "synthesis-failed"
                );
                let starts = event == UtteranceEvent::Started;
                reader.handle_event(id, event);
                if !live {
                    ensure!(reader.is_speaking() == was_speaking, "stale event changed state");
                    ensure!(page.alerts().len() == alerts_before, "stale event raised an alert");
                } else if starts {
                    ensure!(reader.state() == SpeechState::Speaking(id), "start did not speak");
                    ensure!(page.affordance() == Some(Affordance::Stop), "stop affordance missing");
                } else {
                    ensure!(!reader.is_speaking(), "end or error did not release the reader");
                    let alerted = page.alerts().len() > alerts_before;
                    ensure!(alerted == reports, "alert mismatch for step {step}");
                    if alerted {
                        ensure!(
                            page.alerts().last().map(String::as_str) == Some(ALERT_SPEECH_FAILED),
                            "wrong failure alert"
                        );
                    }
                }
            }
        }
    }
    ensure!(engine.spoken().len() == issued.len(), "engine and reader disagree on submissions");
    Ok(())
}

fn preferences(ctx: &mut ScenarioCtx) -> Result<()> {
    let store = MemoryStore::new();
    let prefs = Preferences::new(store.clone());

    let size = f64::from(ctx.rng.gen_range(6..=14_u32) * 10);
    let echoed = prefs.read_or_write(FONT_SIZE_KEY, StorageOp::Write(json!(size)));
    ensure!(echoed == Some(json!(size)), "write did not echo {size}");
    let read = prefs.read_or_write(FONT_SIZE_KEY, StorageOp::Read);
    ensure!(read.as_ref().and_then(Value::as_f64) == Some(size), "read back {read:?}");

    let theme = if ctx.rng.gen_bool(0.5) { Theme::Dark } else { Theme::Light };
    prefs.write(THEME_KEY, theme);
    ensure!(
        store.raw(THEME_KEY) == Some(format!("\"{theme}\"")),
        "theme stored as {:?}",
        store.raw(THEME_KEY)
    );
    ensure!(prefs.read::<Theme>(THEME_KEY) == Some(theme), "theme did not round trip");

    prefs.read_or_write(THEME_KEY, StorageOp::Remove);
    ensure!(prefs.read::<Theme>(THEME_KEY).is_none(), "removed theme still readable");

    let key = format!("scratch-{}", ctx.seed);
    store.set_item(&key, "{not json")?;
    ensure!(
        prefs.read_or_write(&key, StorageOp::Read).is_none(),
        "malformed entry decoded"
    );
    Ok(())
}

fn sound_cues(ctx: &mut ScenarioCtx) -> Result<()> {
    let failures = ctx.rng.gen_range(0..3);
    let pending = ctx.rng.gen_range(0..2);
    let audio = RecordingAudio::new()
        .failing_starts(failures)
        .pending_starts(pending);
    let board = SoundBoard::new(audio.clone());

    let plays = ctx.rng.gen_range(5..15);
    let (mut queued, mut played) = (Vec::new(), Vec::new());
    for attempt in 0..plays {
        let Some(&cue) = Cue::ALL.choose(&mut ctx.rng) else {
            bail!("cue table is empty");
        };
        board.play(cue);
        let note = (cue.note().to_string(), cue.duration().to_string());
        if attempt >= failures + pending {
            played.push(note);
        } else if attempt >= failures {
            queued.push(note);
        }
    }
    ensure!(board.is_started(), "audio never started");
    ensure!(
        audio.starts() == failures + pending + 1,
        "start attempted {} times",
        audio.starts()
    );
    ensure!(audio.queued() == queued, "cues held during a pending start differ");
    ensure!(audio.notes() == played, "played notes differ from the cue table");
    Ok(())
}
