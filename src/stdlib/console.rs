use crate::tree_walk_interpreter::{
    NativeContext, NativeError, NativeFunctionException, RuntimeValue,
};
use std::io::{self, BufRead, BufReader, Stdin, Stdout, Write};

use super::END_OF_INPUT_EXCEPTION;

/// Where console natives read from and write to.
pub trait Console {
    fn write_str(&mut self, text: &str) -> io::Result<()>;
    /// The next line without its line terminator, or `None` at end of input.
    fn read_line(&mut self) -> io::Result<Option<String>>;
}

/// A console over any pair of streams.
pub struct Streams<R, W> {
    input: R,
    output: W,
}

impl<R, W> Streams<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
    pub fn output(&self) -> &W {
        &self.output
    }
    pub fn into_output(self) -> W {
        self.output
    }
}

impl Streams<BufReader<Stdin>, Stdout> {
    pub fn stdio() -> Self {
        Self::new(BufReader::new(io::stdin()), io::stdout())
    }
}

impl<R: BufRead, W: Write> Console for Streams<R, W> {
    fn write_str(&mut self, text: &str) -> io::Result<()> {
        self.output.write_all(text.as_bytes())?;
        self.output.flush()
    }
    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }
        Ok(Some(line))
    }
}

type Out = Result<RuntimeValue, NativeError>;

pub fn write(ctx: &mut NativeContext) -> Out {
    let text = ctx.value("value")?.to_string();
    ctx.console().write_str(&text)?;
    Ok(RuntimeValue::Void)
}

pub fn writeln(ctx: &mut NativeContext) -> Out {
    let text = ctx.value("value")?.to_string() + "\n";
    ctx.console().write_str(&text)?;
    Ok(RuntimeValue::Void)
}

pub fn newline(ctx: &mut NativeContext) -> Out {
    ctx.console().write_str("\n")?;
    Ok(RuntimeValue::Void)
}

pub fn readln(ctx: &mut NativeContext) -> Out {
    match ctx.console().read_line()? {
        Some(line) => Ok(line.into()),
        None => Err(NativeFunctionException::new(END_OF_INPUT_EXCEPTION, "End of input").into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn lines_lose_their_terminators() {
        let mut console = Streams::new("one\r\ntwo\nthree".as_bytes(), Vec::new());
        assert_eq!(console.read_line().unwrap(), Some("one".to_string()));
        assert_eq!(console.read_line().unwrap(), Some("two".to_string()));
        assert_eq!(console.read_line().unwrap(), Some("three".to_string()));
        assert_eq!(console.read_line().unwrap(), None);
    }

    #[test]
    fn writes_reach_the_output() {
        let mut console = Streams::new(io::empty(), Vec::new());
        console.write_str("a").unwrap();
        console.write_str("b\n").unwrap();
        assert_eq!(console.output().as_slice(), b"ab\n");
    }
}
