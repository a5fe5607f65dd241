// Confirmation gate before anything is removed

use std::io::{BufRead, Write};

/// `y` or `yes`, any case, surrounding whitespace ignored.
pub fn is_affirmative(response: &str) -> bool {
    let response = response.trim().to_lowercase();
    response == "y" || response == "yes"
}

/// Lists the planned actions and reads one line. A read failure or end of
/// input counts as a refusal.
pub fn confirm_cleanup<R, W>(include_all_images: bool, input: &mut R, out: &mut W) -> std::io::Result<bool>
where
    R: BufRead,
    W: Write,
{
    writeln!(out, "The following will be removed:")?;
    writeln!(out, "   - all stopped containers (exited or created)")?;
    if include_all_images {
        writeln!(out, "   - all images not used by a container")?;
    } else {
        writeln!(out, "   - dangling images")?;
    }
    writeln!(out, "   - all unused networks")?;
    writeln!(out, "   - all unused volumes")?;
    write!(out, "\nContinue? [y/N]: ")?;
    out.flush()?;

    let mut response = String::new();
    match input.read_line(&mut response) {
        Ok(_) => Ok(is_affirmative(&response)),
        Err(e) => {
            tracing::debug!(error = %e, operation = "confirm_cleanup", "failed to read confirmation");
            Ok(false)
        }
    }
}
