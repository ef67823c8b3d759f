use anyhow::{bail, Error};
use keypad::Keypad;
use std::io::BufRead;
use std::io::Write;

mod calculator;
mod converter;
mod keypad;
mod tokenizer;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    if let Err(e) = run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Error> {
    let mut keypad = Keypad::default();

    let args = std::env::args_os().skip(1);
    let stdout = std::io::stdout();
    let lock = stdout.lock();
    let mut w = std::io::BufWriter::new(lock);

    if args.len() > 0 {
        for arg in args {
            let Some(utf8_arg) = arg.to_str() else {
                bail!("Arguments contain invalid UTF-8 string");
            };

            for char in utf8_arg.chars() {
                press(&mut keypad, char);
            }
        }

        writeln!(&mut w, "{}", display(&keypad))?;
    } else {
        let stdin = std::io::stdin();
        let reader = std::io::BufReader::new(stdin);
        let is_interactive = atty::is(atty::Stream::Stdin);

        if is_interactive {
            write!(&mut w, ">>> ")?;
            w.flush()?;
        }

        for keys in reader.lines() {
            for char in keys?.chars() {
                press(&mut keypad, char);
            }

            writeln!(&mut w, "{}", display(&keypad))?;
            if is_interactive {
                write!(&mut w, ">>> ")?;
                w.flush()?;
            }
        }
    }
    w.flush()?;

    Ok(())
}

fn press(keypad: &mut Keypad, c: char) {
    if let Err(e) = keypad.press(c) {
        log::warn!("{}", e);
    }
}

fn display(keypad: &Keypad) -> String {
    match keypad.previous_display() {
        "" => keypad.buffer().to_string(),
        previous => format!("{} = {}", previous, keypad.buffer()),
    }
}
