use crossterm::{
    event::DisableMouseCapture,
    execute,
    terminal::{LeaveAlternateScreen, disable_raw_mode},
};

/// Installs a panic hook that puts the terminal back into a usable state
/// before reporting. Debug builds get a full backtrace, release builds a
/// crash report file.
pub fn initialize_panic_handler() {
    let default_hook = std::panic::take_hook();

    #[cfg(debug_assertions)]
    {
        let _ = default_hook;
        std::panic::set_hook(Box::new(move |info| {
            restore_terminal();
            better_panic::Settings::auto()
                .most_recent_first(false)
                .lineno_suffix(true)
                .create_panic_handler()(info);
        }));
    }

    #[cfg(not(debug_assertions))]
    {
        let metadata = human_panic::metadata!();
        std::panic::set_hook(Box::new(move |info| {
            restore_terminal();
            let file_path = human_panic::handle_dump(&metadata, info);
            if let Err(e) = human_panic::print_msg(file_path, &metadata) {
                eprintln!("human-panic: printing error message to console failed: {e}");
            }
            default_hook(info);
        }));
    }
}

fn restore_terminal() {
    let _ = disable_raw_mode();
    let _ = execute!(std::io::stderr(), LeaveAlternateScreen, DisableMouseCapture);
}
