//! Basic message output functions.

use std::path::Path;

use super::colors::*;

/// Print an error message.
pub fn print_error(msg: &str) {
    eprintln!("{RED}{BOLD}Error:{RESET} {}", msg);
}

/// Print a warning message.
pub fn print_warning(msg: &str) {
    eprintln!("{YELLOW}Warning:{RESET} {}", msg);
}

/// Print an info message.
pub fn print_info(msg: &str) {
    println!("{CYAN}Info:{RESET} {}", msg);
}

/// Print where the CSV report landed and how many samples it holds.
pub fn print_report_written(path: &Path, samples: usize) {
    println!(
        "{GREEN}Report written:{RESET} {} ({} sample{})",
        path.display(),
        samples,
        if samples == 1 { "" } else { "s" }
    );
}

/// Print interruption message when the user presses Ctrl+C.
pub fn print_interrupted() {
    println!();
    println!("{YELLOW}Interrupted.{RESET} Samples collected so far were saved.");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_print_functions_do_not_panic() {
        print_error("boom");
        print_warning("careful");
        print_info("hello");
        print_report_written(Path::new("output/reports/x.csv"), 0);
        print_report_written(Path::new("output/reports/x.csv"), 1);
        print_interrupted();
    }
}
