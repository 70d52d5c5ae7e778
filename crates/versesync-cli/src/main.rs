use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};
use relative_path::RelativePathBuf;
use std::{env, io::stdout, path::PathBuf, process};
use versesync_config::Config;
use versesync_engine::{MemorySurface, SegmentationOptions, TextViewModel, io};

struct App {
    texts_path: PathBuf,
    options: SegmentationOptions,
    texts: Vec<RelativePathBuf>,
    file_list_state: ListState,
    current_content: Vec<String>,
}

impl App {
    fn new(texts_path: PathBuf, options: SegmentationOptions) -> Result<Self> {
        let texts = io::scan_texts(&texts_path)?
            .iter()
            .filter_map(|path| path.strip_prefix(&texts_path).ok())
            .filter_map(|path| RelativePathBuf::from_path(path).ok())
            .collect();

        let mut app = Self {
            texts_path,
            options,
            texts,
            file_list_state: ListState::default(),
            current_content: Vec::new(),
        };

        if !app.texts.is_empty() {
            app.file_list_state.select(Some(0));
            app.update_content_for_selection();
        }

        Ok(app)
    }

    fn next_file(&mut self) {
        if self.texts.is_empty() {
            return;
        }
        let i = match self.file_list_state.selected() {
            Some(i) => (i + 1) % self.texts.len(),
            None => 0,
        };
        self.file_list_state.select(Some(i));
        self.update_content_for_selection();
    }

    fn previous_file(&mut self) {
        if self.texts.is_empty() {
            return;
        }
        let i = match self.file_list_state.selected() {
            Some(0) | None => self.texts.len() - 1,
            Some(i) => i - 1,
        };
        self.file_list_state.select(Some(i));
        self.update_content_for_selection();
    }

    fn update_content_for_selection(&mut self) {
        let Some(relative_path) = self
            .file_list_state
            .selected()
            .and_then(|index| self.texts.get(index))
        else {
            return;
        };

        self.current_content = match io::read_text(relative_path, &self.texts_path) {
            Ok(content) => {
                let mut model =
                    TextViewModel::new(MemorySurface::new(content), self.options.clone());
                let passes = model.run_deferred();
                log::debug!("{relative_path}: converged after {passes} passes");
                render_segments(&model, passes)
            }
            Err(e) => vec![format!("Error reading text: {e}")],
        };
    }
}

fn render_segments(model: &TextViewModel<MemorySurface>, passes: usize) -> Vec<String> {
    let mut lines = vec![
        format!(
            "{} segments, {} annotation embeds, {passes} corrective passes",
            model.table().len(),
            model.remapper().embed_count()
        ),
        String::new(),
    ];

    lines.extend(model.segments().map(|(segment_ref, range)| {
        format!("{segment_ref} {range} {}", model.segment_text(segment_ref))
    }));

    if !model.embedded_elements().is_empty() {
        lines.push(String::new());
        lines.extend(
            model
                .embedded_elements()
                .iter()
                .map(|(id, position)| format!("embed {id} @{position}")),
        );
    }

    lines
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Warn)
        .init();

    // Determine texts path from CLI args or config file
    let args: Vec<String> = env::args().collect();
    let config_path = Config::config_path();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: Failed to load config file: {e}");
            eprintln!("Usage: {} <texts-folder-path>", args[0]);
            process::exit(1);
        }
    };
    let options = config
        .as_ref()
        .map(Config::segmentation_options)
        .unwrap_or_default();

    let texts_path;
    let from_config;

    if args.len() == 2 {
        texts_path = PathBuf::from(&args[1]);
        from_config = false;
    } else if args.len() == 1 {
        match config {
            Some(config) => {
                texts_path = config.texts_path;
                from_config = true;
            }
            None => {
                eprintln!("Error: No texts path provided and no config file found");
                eprintln!("Usage: {} <texts-folder-path>", args[0]);
                eprintln!("Or create a config file at {}", config_path.display());
                process::exit(1);
            }
        }
    } else {
        eprintln!("Usage: {} [texts-folder-path]", args[0]);
        process::exit(1);
    };

    if let Err(e) = io::validate_texts_dir(&texts_path) {
        let source = if from_config {
            format!(" from config file '{}'", config_path.display())
        } else {
            String::new()
        };
        eprintln!(
            "Error: Texts path '{}'{} is invalid: {e}",
            texts_path.display(),
            source
        );
        process::exit(1);
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = App::new(texts_path, options).and_then(|mut app| run_app(&mut terminal, &mut app));

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{err:?}");
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()>
where
    B::Error: Send + Sync + 'static,
{
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            match key.code {
                KeyCode::Char('q') => return Ok(()),
                KeyCode::Down | KeyCode::Char('j') => app.next_file(),
                KeyCode::Up | KeyCode::Char('k') => app.previous_file(),
                _ => {}
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(f.area());

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(30), Constraint::Percentage(70)])
        .split(rows[0]);

    let file_items: Vec<ListItem> = app
        .texts
        .iter()
        .map(|path| ListItem::new(Line::from(Span::raw(path.to_string()))))
        .collect();

    let files_list = List::new(file_items)
        .block(Block::default().borders(Borders::ALL).title("Texts"))
        .highlight_style(Style::default().bg(Color::Yellow).fg(Color::Black));

    f.render_stateful_widget(files_list, chunks[0], &mut app.file_list_state);

    let content_text = if app.current_content.is_empty() {
        vec![Line::from("Select a text to view its segments")]
    } else {
        app.current_content
            .iter()
            .map(|line| Line::from(vec![Span::raw(line.clone())]))
            .collect()
    };

    let content = Paragraph::new(content_text)
        .block(Block::default().borders(Borders::ALL).title("Segments"))
        .wrap(ratatui::widgets::Wrap { trim: true });

    f.render_widget(content, chunks[1]);

    let help = Paragraph::new(Line::from(vec![
        Span::raw("q: Quit | "),
        Span::raw("↑/k: Previous | "),
        Span::raw("↓/j: Next"),
    ]));

    f.render_widget(help, rows[1]);
}
