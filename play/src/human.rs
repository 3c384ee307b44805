use std::io::{self, BufRead, BufReader, Stdin, Stdout, Write};
use turnplay::prelude::*;

/// A person at a terminal. Shows the observation and keeps asking until the
/// answer is one of the legal moves.
pub struct Human<I: BufRead, O: Write> {
    id: String,
    input: I,
    output: O,
}

impl Human<BufReader<Stdin>, Stdout> {
    pub fn stdio(id: &str) -> Self {
        Self::new(id, BufReader::new(io::stdin()), io::stdout())
    }
}

impl<I: BufRead, O: Write> Human<I, O> {
    pub fn new(id: &str, input: I, output: O) -> Self {
        Self {
            id: id.into(),
            input,
            output,
        }
    }

    fn read_move(&mut self, observation: &Observation) -> Result<ActionId, GameError> {
        let mut line = String::new();
        loop {
            write!(
                self.output,
                "Please enter a valid move ({}): ",
                observation.legal_actions.join(", ")
            )?;
            self.output.flush()?;
            line.clear();
            if self.input.read_line(&mut line)? == 0 {
                return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "no more input").into());
            }
            let answer = line.trim();
            if observation.is_legal(answer) {
                return Ok(answer.into());
            }
        }
    }
}

impl<I: BufRead, O: Write> Player for Human<I, O> {
    fn id(&self) -> &str {
        &self.id
    }

    fn select_move(&mut self, observation: &Observation) -> Result<ActionId, GameError> {
        if observation.is_terminal() {
            writeln!(self.output, "\nThe game is over.\n{}", observation)?;
            return Ok(GAME_OVER.into());
        }
        writeln!(self.output, "\nIt's human player {}'s turn.\n{}", self.id, observation)?;
        self.read_move(observation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn observation() -> Observation {
        let mut scores = BTreeMap::new();
        scores.insert("me".to_string(), 1.0);
        Observation::new(vec!["h".into(), "t".into()], vec![]).with_scores(scores)
    }

    #[test]
    fn test_prompts_until_valid() {
        let mut out = Vec::new();
        let mut human = Human::new("me", "x\n\nheads\n t \nh\n".as_bytes(), &mut out);
        assert_eq!(human.select_move(&observation()).unwrap(), "t");
        drop(human);
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.matches("Please enter a valid move (h, t)").count(), 4);
        assert!(text.contains("me: 1"));
    }

    #[test]
    fn test_shows_picture() {
        let mut out = Vec::new();
        let pictured = observation().with_picture("  |  \n==o==".into());
        let mut human = Human::new("me", "h\n".as_bytes(), &mut out);
        assert_eq!(human.select_move(&pictured).unwrap(), "h");
        drop(human);
        assert!(String::from_utf8(out).unwrap().contains("  |  \n==o=="));
    }

    #[test]
    fn test_end_of_input() {
        let mut human = Human::new("me", "nope\n".as_bytes(), io::sink());
        assert!(matches!(
            human.select_move(&observation()),
            Err(GameError::Io(_))
        ));
    }

    #[test]
    fn test_game_over() {
        let mut human = Human::new("me", "".as_bytes(), io::sink());
        let over = observation().into_terminal();
        assert_eq!(human.select_move(&over).unwrap(), GAME_OVER);
    }
}
