use std::io::{self, Write};

/// Helper function to read a line from stdin, without its line terminator
pub fn read_line() -> io::Result<String> {
    let mut input = String::new();
    if io::stdin().read_line(&mut input)? == 0 {
        return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "stdin closed"));
    }
    Ok(strip_line_ending(&input).to_string())
}

/// Print a prompt without a newline and read the answer
pub fn prompt(message: &str) -> io::Result<String> {
    print!("{}", message);
    io::stdout().flush()?;
    read_line()
}

/// Remove only the trailing newline so passwords keep their own whitespace
fn strip_line_ending(line: &str) -> &str {
    line.strip_suffix('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
        .unwrap_or(line)
}
