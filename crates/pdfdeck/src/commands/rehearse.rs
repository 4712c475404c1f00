use anyhow::{Context, Result};
use colored::Colorize;
use inquire::{InquireError, Text};
use log::info;
use regex::Regex;
use std::path::Path;

use pdfdeck::timer::format_clock;
use pdfdeck::{
    Escape, MediaSource, Movement, Navigator, PageSource, SlideGraph, Surfaces, BLACK, WHITE,
};

use crate::config::Config;

const HELP: &str = "\
  next, n, <enter>   next page (overlay or slide)
  prev, p            previous page
  forward, d         next slide, skipping overlays
  backward, u        previous slide
  overlay+, overlay- step within the current slide only
  first              first overlay of the current slide
  goto, g N[.K]      slide N, overlay K (1-indexed)
  freeze, f          pin the audience view / release it
  black, b           black out the audience view
  white, w           white out the audience view
  pause              pause or resume the timer
  start, home        back to the first slide
  reset, r           first slide and a cleared timer
  links, l           list the links of this page
  link, follow I     follow link I
  media, m           list the videos of this page
  escape, esc, q     undo color, freeze, timer; quit when nothing is left";

/// A console command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Next,
    Prev,
    Forward,
    Backward,
    NextOverlay,
    PrevOverlay,
    First,
    /// 1-indexed slide and overlay
    Goto { slide: usize, overlay: usize },
    Freeze,
    Black,
    White,
    Pause,
    Start,
    Reset,
    Links,
    /// 1-indexed link of the current page
    Follow(usize),
    Media,
    Help,
    Escape,
}

pub struct CommandParser {
    goto: Regex,
    follow: Regex,
}

impl CommandParser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            goto: Regex::new(r"^(?:goto|g)\s+(\d+)(?:\.(\d+))?$")?,
            follow: Regex::new(r"^(?:link|follow)\s+(\d+)$")?,
        })
    }

    pub fn parse(&self, input: &str) -> Option<Command> {
        let input = input.trim().to_lowercase();
        let command = match input.as_str() {
            "" | "next" | "n" => Command::Next,
            "prev" | "p" => Command::Prev,
            "forward" | "d" => Command::Forward,
            "backward" | "u" => Command::Backward,
            "overlay+" => Command::NextOverlay,
            "overlay-" => Command::PrevOverlay,
            "first" => Command::First,
            "freeze" | "f" => Command::Freeze,
            "black" | "b" => Command::Black,
            "white" | "w" => Command::White,
            "pause" => Command::Pause,
            "start" | "home" => Command::Start,
            "reset" | "r" => Command::Reset,
            "links" | "l" => Command::Links,
            "media" | "m" => Command::Media,
            "help" | "h" | "?" => Command::Help,
            "escape" | "esc" | "q" => Command::Escape,
            other => return self.parse_with_argument(other),
        };
        Some(command)
    }

    fn parse_with_argument(&self, input: &str) -> Option<Command> {
        if let Some(caps) = self.goto.captures(input) {
            let slide = caps[1].parse().ok()?;
            let overlay = match caps.get(2) {
                Some(m) => m.as_str().parse().ok()?,
                None => 1,
            };
            return Some(Command::Goto { slide, overlay });
        }
        if let Some(caps) = self.follow.captures(input) {
            return Some(Command::Follow(caps[1].parse().ok()?));
        }
        None
    }
}

/// What the console does after a command.
#[derive(Debug, PartialEq)]
pub enum Reply {
    Done,
    Message(String),
    Quit,
}

/// A rehearsal over one document.
pub struct Session<'a, S> {
    source: &'a S,
    graph: &'a SlideGraph,
    nav: Navigator,
}

impl<'a, S: PageSource> Session<'a, S> {
    pub fn new(source: &'a S, graph: &'a SlideGraph, nav: Navigator) -> Self {
        Self { source, graph, nav }
    }

    pub fn navigator(&self) -> &Navigator {
        &self.nav
    }

    pub fn apply(&mut self, command: Command) -> Result<Reply> {
        let graph = self.graph;
        let movement = match command {
            Command::Next => self.nav.next(graph, false),
            Command::Prev => self.nav.prev(graph, false),
            Command::Forward => self.nav.forward(graph),
            Command::Backward => self.nav.backward(graph),
            Command::NextOverlay => self.nav.next_overlay(graph),
            Command::PrevOverlay => self.nav.prev_overlay(graph),
            Command::First => self.nav.first_of_group(graph),
            Command::Goto { slide, overlay } => {
                let slide = slide as isize - 1;
                let overlay = overlay as isize - 1;
                return Ok(match self.nav.set_position(graph, slide, overlay) {
                    Ok(()) => Reply::Done,
                    Err(e) => Reply::Message(e.to_string()),
                });
            }
            Command::Follow(index) => {
                let links = graph.links(self.nav.current(), self.source)?;
                let Some(link) = index.checked_sub(1).and_then(|i| links.items().get(i)) else {
                    return Ok(Reply::Message(format!("No link {index} on this page")));
                };
                self.nav.jump_to_link(link)
            }
            Command::Freeze => {
                if !self.nav.freeze() {
                    return Ok(Reply::Message(
                        "Freeze needs a separate audience view".to_string(),
                    ));
                }
                return Ok(Reply::Done);
            }
            Command::Black => {
                self.nav.trigger_color(BLACK);
                return Ok(Reply::Done);
            }
            Command::White => {
                self.nav.trigger_color(WHITE);
                return Ok(Reply::Done);
            }
            Command::Pause => {
                self.nav.toggle_pause();
                return Ok(Reply::Done);
            }
            Command::Start => {
                self.nav.start(graph);
                return Ok(Reply::Done);
            }
            Command::Reset => {
                self.nav.reset(graph);
                return Ok(Reply::Done);
            }
            Command::Links => return self.list_links().map(Reply::Message),
            Command::Media => return self.list_media().map(Reply::Message),
            Command::Help => return Ok(Reply::Message(HELP.to_string())),
            Command::Escape => {
                return Ok(match self.nav.escape() {
                    Escape::ClearedColor => Reply::Message("Color cleared".to_string()),
                    Escape::Unfrozen => Reply::Message("Audience view released".to_string()),
                    Escape::Paused => Reply::Message("Timer paused".to_string()),
                    Escape::Quit => Reply::Quit,
                });
            }
        };
        Ok(match movement {
            Movement::Moved => Reply::Done,
            Movement::Stayed => Reply::Message("Nothing there".to_string()),
        })
    }

    /// One line per link: index, target slide and position.
    fn list_links(&self) -> Result<String> {
        let links = self.graph.links(self.nav.current(), self.source)?;
        if links.items().is_empty() {
            return Ok("No links on this page".to_string());
        }
        let lines: Vec<String> = links
            .items()
            .iter()
            .enumerate()
            .map(|(i, link)| {
                format!(
                    "  {}. -> {} at ({:.0}, {:.0})",
                    i + 1,
                    self.describe(link.target),
                    link.region.x,
                    link.region.y
                )
            })
            .collect();
        Ok(lines.join("\n"))
    }

    fn list_media(&self) -> Result<String> {
        let media = self.graph.media(self.nav.current(), self.source)?;
        if media.items().is_empty() {
            return Ok("No videos on this page".to_string());
        }
        let lines: Vec<String> = media
            .items()
            .iter()
            .enumerate()
            .map(|(i, item)| match &item.source {
                MediaSource::File(path) => format!("  {}. {}", i + 1, path.display()),
                MediaSource::Embedded { name, mime, data } => format!(
                    "  {}. {name} (embedded, {}, {} bytes)",
                    i + 1,
                    mime.as_deref().unwrap_or("unknown type"),
                    data.len()
                ),
            })
            .collect();
        Ok(lines.join("\n"))
    }

    /// `slide 3 "2" overlay 2/4` for a physical page.
    fn describe(&self, page: usize) -> String {
        let Some(node) = self.graph.node(page) else {
            return format!("page {}", page + 1);
        };
        let count = self.graph.groups()[node.logical_index()].count();
        let mut text = format!("slide {} \"{}\"", node.logical_index() + 1, node.label());
        if count > 1 {
            text.push_str(&format!(" overlay {}/{count}", node.overlay_position() + 1));
        }
        text
    }

    /// The presenter view as text.
    pub fn status(&self) -> Vec<String> {
        let nav = &self.nav;
        let (index, count) = nav.progress(self.graph);
        let mut lines = vec![format!(
            "[{}/{count}] {}",
            index + 1,
            self.describe(nav.current())
        )];

        if let Some(notes) = self
            .graph
            .node(nav.current())
            .and_then(|node| super::note_source(self.graph, node))
        {
            lines.push(format!("  notes: {notes}"));
        }
        match (nav.upcoming_overlay(self.graph), nav.upcoming(self.graph)) {
            (Some(overlay), _) => lines.push(format!("  next:  {}", self.describe(overlay))),
            (None, Some(slide)) => lines.push(format!("  next:  {}", self.describe(slide))),
            (None, None) => lines.push("  next:  end of deck".to_string()),
        }
        if let Some(frozen) = nav.freeze_target() {
            lines.push(format!("  audience frozen on {}", self.describe(frozen)));
        }
        if let Some(color) = nav.color_override() {
            let name = if color == BLACK {
                "black".to_string()
            } else if color == WHITE {
                "white".to_string()
            } else {
                format!("{:?}", color.0)
            };
            lines.push(format!("  audience view: {name}"));
        }
        let clock = format_clock(nav.timer().elapsed());
        if nav.timer().is_running() {
            lines.push(format!("  time:  {clock}"));
        } else {
            lines.push(format!("  time:  {clock} (paused)"));
        }
        lines
    }
}

pub fn run(file: &Path, slide: Option<usize>, single: bool) -> Result<()> {
    let config = Config::load_or_default();
    let (document, graph) =
        pdfdeck::open(file).with_context(|| format!("Failed to open {}", file.display()))?;

    let surfaces = if single {
        Surfaces::Single
    } else {
        config.surfaces()
    };
    let mut nav = Navigator::new(&graph, surfaces).with_prev_policy(config.prev_policy());
    if let Some(n) = slide.or(config.start_slide()) {
        nav = nav.with_start_slide(&graph, n as isize - 1).map_err(|_| {
            anyhow::anyhow!(
                "Slide {n} does not exist ({} slides)",
                graph.slide_count()
            )
        })?;
    }
    info!(
        "Rehearsing {} ({} slides, layout {}, prev policy {})",
        file.display(),
        graph.slide_count(),
        graph.mode(),
        nav.prev_policy().name()
    );

    let parser = CommandParser::new()?;
    let mut session = Session::new(&document, &graph, nav);

    println!(
        "{} {} - type {} for commands",
        "pdfdeck".bold(),
        file.display(),
        "h".cyan()
    );
    loop {
        println!();
        let mut lines = session.status().into_iter();
        if let Some(head) = lines.next() {
            println!("{}", head.bold());
        }
        for line in lines {
            println!("{}", line.dimmed());
        }

        let input = match Text::new(">").prompt() {
            Ok(input) => input,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(e) => return Err(e.into()),
        };
        let Some(command) = parser.parse(&input) else {
            println!("{}", format!("Unknown command: {}", input.trim()).red());
            continue;
        };
        match session.apply(command)? {
            Reply::Done => {}
            Reply::Message(message) => println!("{}", message.yellow()),
            Reply::Quit => break,
        }
    }
    info!(
        "Rehearsal ended after {}",
        format_clock(session.navigator().timer().elapsed())
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::fixtures::Deck;
    use pdfdeck::LayoutMode;

    fn parse(input: &str) -> Option<Command> {
        CommandParser::new().unwrap().parse(input)
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse(""), Some(Command::Next));
        assert_eq!(parse("  N "), Some(Command::Next));
        assert_eq!(parse("backward"), Some(Command::Backward));
        assert_eq!(parse("overlay+"), Some(Command::NextOverlay));
        assert_eq!(parse("esc"), Some(Command::Escape));
        assert_eq!(parse("g 4"), Some(Command::Goto { slide: 4, overlay: 1 }));
        assert_eq!(
            parse("goto 12.3"),
            Some(Command::Goto {
                slide: 12,
                overlay: 3
            })
        );
        assert_eq!(parse("follow 2"), Some(Command::Follow(2)));
        assert_eq!(parse("goto"), None);
        assert_eq!(parse("g 1.2.3"), None);
        assert_eq!(parse("jump"), None);
    }

    fn new_session<'a>(deck: &'a Deck, graph: &'a SlideGraph, surfaces: Surfaces) -> Session<'a, Deck> {
        Session::new(deck, graph, Navigator::new(graph, surfaces))
    }

    #[test]
    fn test_walk_through_overlays() {
        let deck = Deck::new(&["1", "2", "2", "3"]);
        let graph = SlideGraph::build(&deck, LayoutMode::None).unwrap();
        let mut session = new_session(&deck, &graph, Surfaces::Dual);

        assert_eq!(session.apply(Command::Forward).unwrap(), Reply::Done);
        assert_eq!(session.navigator().current(), 1);
        assert_eq!(session.status()[0], "[2/3] slide 2 \"2\" overlay 1/2");
        assert_eq!(session.status()[1], "  next:  slide 2 \"2\" overlay 2/2");

        session.apply(Command::Next).unwrap();
        session.apply(Command::Next).unwrap();
        assert_eq!(session.navigator().current(), 3);
        assert_eq!(
            session.apply(Command::Next).unwrap(),
            Reply::Message("Nothing there".to_string())
        );
        assert!(session.status().contains(&"  next:  end of deck".to_string()));
    }

    #[test]
    fn test_goto_is_one_indexed() {
        let deck = Deck::new(&["1", "2", "2", "3"]);
        let graph = SlideGraph::build(&deck, LayoutMode::None).unwrap();
        let mut session = new_session(&deck, &graph, Surfaces::Dual);

        session.apply(Command::Goto { slide: 2, overlay: 2 }).unwrap();
        assert_eq!(session.navigator().current(), 2);

        let reply = session.apply(Command::Goto { slide: 9, overlay: 1 }).unwrap();
        assert!(matches!(reply, Reply::Message(_)), "{reply:?}");
        let reply = session.apply(Command::Goto { slide: 0, overlay: 1 }).unwrap();
        assert!(matches!(reply, Reply::Message(_)), "{reply:?}");
        assert_eq!(session.navigator().current(), 2, "bad goto does not move");
    }

    #[test]
    fn test_links_and_follow() {
        let deck = Deck::new(&["1", "2", "3"]).with_goto(0, 3);
        let graph = SlideGraph::build(&deck, LayoutMode::None).unwrap();
        let mut session = new_session(&deck, &graph, Surfaces::Dual);

        let Reply::Message(listing) = session.apply(Command::Links).unwrap() else {
            panic!("expected a listing");
        };
        assert!(listing.contains("1. -> slide 3 \"3\""), "{listing}");

        assert!(matches!(
            session.apply(Command::Follow(2)).unwrap(),
            Reply::Message(_)
        ));
        assert_eq!(session.apply(Command::Follow(1)).unwrap(), Reply::Done);
        assert_eq!(session.navigator().current(), 2);
    }

    #[test]
    fn test_escape_cascade_then_quit() {
        let deck = Deck::new(&["1", "2"]);
        let graph = SlideGraph::build(&deck, LayoutMode::None).unwrap();
        let mut session = new_session(&deck, &graph, Surfaces::Dual);

        session.apply(Command::Freeze).unwrap();
        session.apply(Command::Black).unwrap();
        assert!(session.status().iter().any(|l| l.contains("audience view: black")));

        assert_eq!(
            session.apply(Command::Escape).unwrap(),
            Reply::Message("Color cleared".to_string())
        );
        assert_eq!(
            session.apply(Command::Escape).unwrap(),
            Reply::Message("Audience view released".to_string())
        );
        assert_eq!(session.apply(Command::Escape).unwrap(), Reply::Quit);
    }

    #[test]
    fn test_freeze_needs_two_surfaces() {
        let deck = Deck::new(&["1", "2"]);
        let graph = SlideGraph::build(&deck, LayoutMode::None).unwrap();
        let mut session = new_session(&deck, &graph, Surfaces::Single);

        assert!(matches!(
            session.apply(Command::Freeze).unwrap(),
            Reply::Message(_)
        ));
        assert!(!session.navigator().is_frozen());
    }
}
