use std::cell::RefCell;
use std::rc::Rc;

use rustyline::error::ReadlineError;
use rustyline::Editor;

use monkey_interpreter::object::Object;
use monkey_interpreter::{evaluate_source, Environment};

const VERSION: &str = env!("CARGO_PKG_VERSION");

const MONKEY_FACE: &str = r#"            __,__
   .--.  .-"     "-.  .--.
  / .. \/  .-. .-.  \/ .. \
 | |  '|  /   Y   \  |'  | |
 | \   \  \ 0 | 0 /  /   / |
  \ '- ,\.-"""""""-./, -' /
   ''-' /_   ^ ^   _\ '-''
       |  \._   _./  |
       \   \ '~' /   /
        '._ '-=-' _.'
           '-----'
"#;

const PROMPT: &str = ">>> ";

pub fn repl() {
    println!("{}", MONKEY_FACE);
    println!("Monkey v{}", VERSION);

    // One environment for the whole session; bindings accumulate
    let env = Rc::new(RefCell::new(Environment::new()));

    // `()` can be used when no completer is required
    let mut rl = Editor::<()>::new();
    loop {
        let readline = rl.readline(PROMPT);
        match readline {
            Ok(line) => {
                if line.trim() == "exit" || line.trim() == "quit" {
                    break;
                }
                // Skip empty lines
                else if line.trim().is_empty() {
                    continue;
                }

                rl.add_history_entry(line.as_str());

                match evaluate_source(&line, &env) {
                    Ok(result) => {
                        // Errors print with their ERROR: prefix through Display;
                        // a null result stays silent
                        if *result != Object::Null {
                            println!("{}", result.to_code_string());
                        }
                    }
                    Err(error) => {
                        println!("ERROR: {}", error);
                    }
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(err) => {
                println!("ERROR: {:?}", err);
                break;
            }
        }
    }
}
