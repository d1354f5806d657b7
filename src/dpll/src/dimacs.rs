/*****************************************************************************************[dimacs.rs]
Copyright (c) 2003-2006, Niklas Een, Niklas Sorensson (MiniSat)
Copyright (c) 2007-2010, Niklas Sorensson (MiniSat)
Copyright (c) 2018-2018, Masaki Hara

Permission is hereby granted, free of charge, to any person obtaining a copy of this software and
associated documentation files (the "Software"), to deal in the Software without restriction,
including without limitation the rights to use, copy, modify, merge, publish, distribute,
sublicense, and/or sell copies of the Software, and to permit persons to whom the Software is
furnished to do so, subject to the following conditions:

The above copyright notice and this permission notice shall be included in all copies or
substantial portions of the Software.

THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR IMPLIED, INCLUDING BUT
NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM,
DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT
OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.
**************************************************************************************************/

//! Reading and writing CNF problems in the DIMACS format.
//!
//! Literals are plain DIMACS integers here: `3` is variable 3, `-3` its
//! negation, and `0` terminates a clause.

use {
    crate::{interface::SolverInterface, Lit},
    std::io::{self, BufRead, Write},
    thiserror::Error,
};

/// Errors while decoding or encoding DIMACS.
#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("missing problem header")]
    MissingHeader,
    #[error("missing instance format in header")]
    MissingFormat,
    #[error("invalid instance format in header: {0:?}")]
    InvalidFormat(String),
    #[error("missing number of variables in header")]
    MissingNumVars,
    #[error("missing number of clauses in header")]
    MissingNumClauses,
    #[error("invalid number: {0:?}")]
    InvalidNumber(String),
    #[error("too many fields in header")]
    TooManyHeaderFields,
    #[error("more clauses than declared in header")]
    TooManyClauses,
    #[error("invalid clause: missing terminating 0")]
    MissingTerminator,
    #[error("invalid clause: unexpected literal after terminating 0")]
    UnexpectedAfterTerminator,
    #[error("literal {0} is outside of the declared variable range")]
    VarOutOfRange(i32),
    #[error("fewer clauses than declared in header")]
    TooFewClauses,
    #[error("no header written")]
    NoHeader,
    #[error("too many literals in clause")]
    TooManyLiterals,
    #[error("invalid literal: {0}")]
    InvalidLiteral(i32),
    #[error("duplicate variable: {0}")]
    DuplicateVar(u32),
    #[error("not enough clauses encoded")]
    NotEnoughClauses,
}

impl From<Error> for io::Error {
    fn from(e: Error) -> io::Error {
        match e {
            Error::Io(e) => e,
            e => io::Error::new(io::ErrorKind::InvalidData, e),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// The `p cnf <num_vars> <num_clauses>` line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub num_vars: u32,
    pub num_clauses: usize,
}

/// A whole CNF problem, clauses as DIMACS integers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Problem {
    pub num_vars: u32,
    pub clauses: Vec<Vec<i32>>,
}

impl Problem {
    /// Decode a complete problem from `input`.
    ///
    /// ```
    /// use dpll::dimacs::Problem;
    /// let p = Problem::decode("c example\np cnf 3 2\n1 -2 0\n3 0\n".as_bytes()).unwrap();
    /// assert_eq!(p.num_vars, 3);
    /// assert_eq!(p.clauses, vec![vec![1, -2], vec![3]]);
    /// ```
    pub fn decode<R: BufRead>(input: R) -> Result<Problem> {
        Decoder::new(input).problem()
    }

    /// Add every clause of the problem to `solver`.
    pub fn add_to<S: SolverInterface>(&self, solver: &mut S) -> bool {
        if self.num_vars > 0 {
            solver.var_of_int(self.num_vars);
        }
        let mut lits = vec![];
        for c in &self.clauses {
            lits.clear();
            lits.extend(c.iter().map(|&i| Lit::from_dimacs(i)));
            if !solver.add_clause_reuse(&mut lits) {
                return false;
            }
        }
        true
    }
}

/// Write `p` to `out`, header first.
pub fn encode_problem<W: Write>(out: W, p: &Problem) -> Result<()> {
    let mut enc = Encoder::new(out);
    enc.write_header(Header {
        num_vars: p.num_vars,
        num_clauses: p.clauses.len(),
    })?;
    for c in &p.clauses {
        enc.encode(c)?;
    }
    enc.finish()
}

/// Line-oriented DIMACS reader: a header line, then one clause per line.
///
/// Lines starting with `c` and blank lines are ignored everywhere.
pub struct Decoder<R> {
    input: R,
    line: String,
    header: Option<Header>,
    strict: bool,
    n: usize,
    clause: Vec<i32>,
    seen: Vec<bool>,
}

impl<R: BufRead> Decoder<R> {
    pub fn new(input: R) -> Self {
        Decoder {
            input,
            line: String::new(),
            header: None,
            strict: false,
            n: 0,
            clause: vec![],
            seen: vec![],
        }
    }

    /// In strict mode, reaching the end of input before the number of
    /// clauses declared in the header is an error.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Read the next significant line into `self.line`. `false` at EOF.
    fn next_line(&mut self) -> Result<bool> {
        loop {
            self.line.clear();
            if self.input.read_line(&mut self.line)? == 0 {
                return Ok(false);
            }
            let trimmed = self.line.trim_start();
            if !trimmed.is_empty() && !trimmed.starts_with('c') {
                return Ok(true);
            }
        }
    }

    /// The problem header, parsed on first call.
    pub fn header(&mut self) -> Result<Header> {
        if let Some(h) = self.header {
            return Ok(h);
        }
        if !self.next_line()? {
            return Err(Error::MissingHeader);
        }

        let mut fields = self.line.split_whitespace();
        if fields.next() != Some("p") {
            return Err(Error::MissingHeader);
        }
        match fields.next() {
            Some("cnf") => (),
            None => return Err(Error::MissingFormat),
            Some(f) => return Err(Error::InvalidFormat(f.to_string())),
        }
        let num_vars = match fields.next() {
            None => return Err(Error::MissingNumVars),
            Some(f) => f
                .parse::<u32>()
                .map_err(|_| Error::InvalidNumber(f.to_string()))?,
        };
        let num_clauses = match fields.next() {
            None => return Err(Error::MissingNumClauses),
            Some(f) => f
                .parse::<usize>()
                .map_err(|_| Error::InvalidNumber(f.to_string()))?,
        };
        if fields.next().is_some() {
            return Err(Error::TooManyHeaderFields);
        }

        let h = Header {
            num_vars,
            num_clauses,
        };
        self.header = Some(h);
        self.seen = vec![false; num_vars as usize + 1];
        Ok(h)
    }

    /// Decode the next clause, `None` once the input is exhausted.
    pub fn decode(&mut self) -> Result<Option<&[i32]>> {
        let h = self.header()?;
        if !self.next_line()? {
            if self.strict && self.n < h.num_clauses {
                return Err(Error::TooFewClauses);
            }
            return Ok(None);
        }
        if self.n >= h.num_clauses {
            return Err(Error::TooManyClauses);
        }
        self.n += 1;

        for &x in &self.clause {
            self.seen[x.unsigned_abs() as usize] = false;
        }
        self.clause.clear();
        let mut terminated = false;
        for field in self.line.split_whitespace() {
            if terminated {
                return Err(Error::UnexpectedAfterTerminator);
            }
            let x: i32 = field
                .parse()
                .map_err(|_| Error::InvalidNumber(field.to_string()))?;
            if x == 0 {
                terminated = true;
            } else if x.unsigned_abs() > h.num_vars {
                return Err(Error::VarOutOfRange(x));
            } else if self.seen[x.unsigned_abs() as usize] {
                return Err(Error::DuplicateVar(x.unsigned_abs()));
            } else {
                self.seen[x.unsigned_abs() as usize] = true;
                self.clause.push(x);
            }
        }
        if !terminated {
            return Err(Error::MissingTerminator);
        }
        Ok(Some(&self.clause))
    }

    /// Decode the header and all remaining clauses.
    pub fn problem(mut self) -> Result<Problem> {
        let h = self.header()?;
        let mut clauses = Vec::with_capacity(h.num_clauses);
        while let Some(c) = self.decode()? {
            clauses.push(c.to_vec());
        }
        Ok(Problem {
            num_vars: h.num_vars,
            clauses,
        })
    }
}

/// DIMACS writer. The header must be written first, and `finish` must be
/// called once all the declared clauses are written.
pub struct Encoder<W: Write> {
    out: io::BufWriter<W>,
    header: Option<Header>,
    seen: Vec<bool>,
    n: usize,
}

impl<W: Write> Encoder<W> {
    pub fn new(out: W) -> Self {
        Encoder {
            out: io::BufWriter::new(out),
            header: None,
            seen: vec![],
            n: 0,
        }
    }

    pub fn write_header(&mut self, h: Header) -> Result<()> {
        self.header = Some(h);
        self.seen = vec![false; h.num_vars as usize + 1];
        writeln!(self.out, "p cnf {} {}", h.num_vars, h.num_clauses)?;
        Ok(())
    }

    /// Write one clause. Nothing is written if the clause is rejected.
    pub fn encode(&mut self, clause: &[i32]) -> Result<()> {
        let h = self.header.ok_or(Error::NoHeader)?;
        if clause.len() > h.num_vars as usize {
            return Err(Error::TooManyLiterals);
        }
        if self.n >= h.num_clauses {
            return Err(Error::TooManyClauses);
        }

        for x in self.seen.iter_mut() {
            *x = false;
        }
        for &lit in clause {
            let v = lit.unsigned_abs();
            if v == 0 || v > h.num_vars {
                return Err(Error::InvalidLiteral(lit));
            }
            if self.seen[v as usize] {
                return Err(Error::DuplicateVar(v));
            }
            self.seen[v as usize] = true;
        }

        for &lit in clause {
            write!(self.out, "{} ", lit)?;
        }
        self.out.write_all(b"0\n")?;
        self.n += 1;
        Ok(())
    }

    /// Check the clause count and flush the output.
    pub fn finish(&mut self) -> Result<()> {
        let h = self.header.ok_or(Error::NoHeader)?;
        if self.n != h.num_clauses {
            return Err(Error::NotEnoughClauses);
        }
        self.out.flush()?;
        Ok(())
    }
}

/// `parse(input, solver, is_strict)` adds the content of `input` to the solver
///
/// Clauses may span several lines, and the header is optional.
///
/// ## Params
/// - `is_strict` if true, will fail if the number of clauses does not match the declared header,
///   or if a literal refers to a variable above the declared number of variables
/// - `solver` receives the clauses; variables are created on demand
///
/// ```
/// use dpll::*;
/// let mut s = BasicSolver::default();
/// let input = "p cnf 3 2\n1 -2\n 3 0\n-1 0\n";
/// dimacs::parse(&mut input.as_bytes(), &mut s, true).unwrap();
/// assert_eq!(s.num_vars(), 3);
/// assert!(s.solve(&[]));
/// ```
pub fn parse<S: SolverInterface, R: BufRead>(
    input: &mut R,
    solver: &mut S,
    is_strict: bool,
) -> Result<()> {
    let mut lits = vec![];
    let mut num_vars = None;
    let mut num_clauses = None;
    let mut num_read_clauses = 0;
    loop {
        skip_whitespace(input)?;
        let ch = next_byte(input)?;
        if ch == Some(b'p') {
            let mut header = [0; 5];
            input.read_exact(&mut header)?;
            if &header != b"p cnf" {
                return Err(Error::InvalidFormat(
                    String::from_utf8_lossy(&header).into_owned(),
                ));
            }
            let nv = parse_int(input)?;
            let n = parse_int(input)?;
            if nv < 0 {
                return Err(Error::InvalidNumber(nv.to_string()));
            }
            if n < 0 {
                return Err(Error::InvalidNumber(n.to_string()));
            }
            if nv > 0 {
                solver.var_of_int(nv as u32);
            }
            num_vars = Some(nv as u32);
            num_clauses = Some(n as usize);
        } else if ch == Some(b'c') {
            skip_line(input)?;
        } else if ch.is_some() {
            let max_var = if is_strict { num_vars } else { None };
            read_clause(input, solver, &mut lits, max_var)?;
            num_read_clauses += 1;
            if is_strict && num_clauses.map_or(false, |n| num_read_clauses > n) {
                return Err(Error::TooManyClauses);
            }
            solver.add_clause_reuse(&mut lits);
        } else {
            break;
        }
    }
    match num_clauses {
        Some(n) if is_strict && num_read_clauses < n => Err(Error::TooFewClauses),
        None if is_strict => Err(Error::MissingHeader),
        _ => Ok(()),
    }
}

fn read_clause<S: SolverInterface, R: BufRead>(
    input: &mut R,
    solver: &mut S,
    lits: &mut Vec<Lit>,
    max_var: Option<u32>,
) -> Result<()> {
    lits.clear();
    loop {
        skip_whitespace(input)?;
        if next_byte(input)?.is_none() {
            return Err(Error::MissingTerminator);
        }
        let parsed_lit = parse_int(input)?;
        if parsed_lit == 0 {
            return Ok(());
        }
        if max_var.map_or(false, |n| parsed_lit.unsigned_abs() > n) {
            return Err(Error::VarOutOfRange(parsed_lit));
        }
        let var = solver.var_of_int(parsed_lit.unsigned_abs());
        lits.push(Lit::new(var, parsed_lit > 0));
    }
}

fn parse_int<R: BufRead>(input: &mut R) -> Result<i32> {
    skip_whitespace(input)?;
    let ch = next_byte(input)?;
    let neg = if ch == Some(b'+') || ch == Some(b'-') {
        input.consume(1);
        ch == Some(b'-')
    } else {
        false
    };
    match next_byte(input)? {
        Some(ch) if ch.is_ascii_digit() => (),
        Some(ch) => return Err(Error::InvalidNumber((ch as char).to_string())),
        None => return Err(Error::InvalidNumber(String::new())),
    }
    let mut val: i32 = 0;
    while let Some(ch) = next_byte(input)? {
        if !ch.is_ascii_digit() {
            break;
        }
        input.consume(1);
        val = val
            .checked_mul(10)
            .and_then(|v| v.checked_add((ch - b'0') as i32))
            .ok_or_else(|| Error::InvalidNumber(format!("{}{}...", val, ch as char)))?;
    }
    Ok(if neg { -val } else { val })
}

#[inline(always)]
fn is_whitespace(ch: Option<u8>) -> bool {
    ch.map_or(false, |ch| ch.is_ascii_whitespace() || ch == b'\x0b')
}

fn skip_whitespace<R: BufRead>(input: &mut R) -> Result<()> {
    while is_whitespace(next_byte(input)?) {
        input.consume(1);
    }
    Ok(())
}

fn skip_line<R: BufRead>(input: &mut R) -> Result<()> {
    while let Some(ch) = next_byte(input)? {
        input.consume(1);
        if ch == b'\n' {
            break;
        }
    }
    Ok(())
}

fn next_byte<R: BufRead>(input: &mut R) -> io::Result<Option<u8>> {
    Ok(input.fill_buf()?.first().copied())
}

#[cfg(test)]
mod test {
    use super::*;

    fn decode(s: &str) -> Result<Problem> {
        Problem::decode(s.as_bytes())
    }

    #[test]
    fn test_decode_problems() {
        let p = decode("p cnf 3 0\n").unwrap();
        assert_eq!(p, Problem { num_vars: 3, clauses: vec![] });

        let p = decode("p cnf 3 1\n0\n").unwrap();
        assert_eq!(p.clauses, vec![Vec::<i32>::new()]);

        let p = decode("p cnf 3 1\n-1 0\n").unwrap();
        assert_eq!(p.clauses, vec![vec![-1]]);

        let p = decode("c a comment\np cnf 3 2\nc another\n\n-1 0\n  2 3 0  \n").unwrap();
        assert_eq!(p.clauses, vec![vec![-1], vec![2, 3]]);
    }

    #[test]
    fn test_header_errors() {
        let cases: &[(&str, fn(&Error) -> bool)] = &[
            ("", |e| matches!(e, Error::MissingHeader)),
            ("1 2 0\n", |e| matches!(e, Error::MissingHeader)),
            ("p\n", |e| matches!(e, Error::MissingFormat)),
            ("p dnf 1 1\n", |e| matches!(e, Error::InvalidFormat(f) if f == "dnf")),
            ("p cnf\n", |e| matches!(e, Error::MissingNumVars)),
            ("p cnf 3\n", |e| matches!(e, Error::MissingNumClauses)),
            ("p cnf x 1\n", |e| matches!(e, Error::InvalidNumber(f) if f == "x")),
            ("p cnf 3 -1\n", |e| matches!(e, Error::InvalidNumber(_))),
            ("p cnf 3 1 2\n", |e| matches!(e, Error::TooManyHeaderFields)),
        ];
        for (input, check) in cases {
            match decode(input) {
                Ok(p) => panic!("{:?}: unexpected success {:?}", input, p),
                Err(e) => assert!(check(&e), "{:?}: unexpected error {:?}", input, e),
            }
        }
    }

    #[test]
    fn test_clause_errors() {
        assert!(matches!(
            decode("p cnf 3 1\n1 0\n2 0\n"),
            Err(Error::TooManyClauses)
        ));
        assert!(matches!(
            decode("p cnf 3 1\n1 2\n"),
            Err(Error::MissingTerminator)
        ));
        assert!(matches!(
            decode("p cnf 3 1\n1 0 2\n"),
            Err(Error::UnexpectedAfterTerminator)
        ));
        assert!(matches!(
            decode("p cnf 3 1\n1 -4 0\n"),
            Err(Error::VarOutOfRange(-4))
        ));
        assert!(matches!(
            decode("p cnf 3 1\n1 a 0\n"),
            Err(Error::InvalidNumber(_))
        ));
        assert!(matches!(
            decode("p cnf 2 1\n1 -1 0\n"),
            Err(Error::DuplicateVar(1))
        ));
        assert!(matches!(
            decode("p cnf 3 1\n2 3 -2 0\n"),
            Err(Error::DuplicateVar(2))
        ));
    }

    #[test]
    fn test_duplicate_check_is_per_clause() {
        let mut d = Decoder::new("p cnf 2 3\n1 -2 0\n-1 2 0\n2 0\n".as_bytes()).strict(true);
        assert_eq!(d.decode().unwrap(), Some(&[1, -2][..]));
        assert_eq!(d.decode().unwrap(), Some(&[-1, 2][..]));
        assert_eq!(d.decode().unwrap(), Some(&[2][..]));
        assert_eq!(d.decode().unwrap(), None);

        let res = Decoder::new("p cnf 2 1\n1 -1 0\n".as_bytes()).strict(true).problem();
        assert!(matches!(res, Err(Error::DuplicateVar(1))));
    }

    #[test]
    fn test_parse_var_out_of_range() {
        let mut s = crate::BasicSolver::default();
        let r = parse(&mut "p cnf 2 1\n5 0\n".as_bytes(), &mut s, true);
        assert!(matches!(r, Err(Error::VarOutOfRange(5))));
        assert_eq!(s.num_vars(), 2);

        let mut s = crate::BasicSolver::default();
        parse(&mut "p cnf 2 1\n-5 0\n".as_bytes(), &mut s, false).unwrap();
        assert_eq!(s.num_vars(), 5);
    }

    #[test]
    fn test_strict_decoder() {
        let input = "p cnf 3 2\n1 0\n";
        assert!(decode(input).is_ok());
        let res = Decoder::new(input.as_bytes()).strict(true).problem();
        assert!(matches!(res, Err(Error::TooFewClauses)));
    }

    #[test]
    fn test_decoder_streaming() {
        let mut d = Decoder::new("p cnf 2 2\n1 2 0\n-1 0\n".as_bytes());
        assert_eq!(
            d.header().unwrap(),
            Header {
                num_vars: 2,
                num_clauses: 2
            }
        );
        assert_eq!(d.decode().unwrap(), Some(&[1, 2][..]));
        assert_eq!(d.decode().unwrap(), Some(&[-1][..]));
        assert_eq!(d.decode().unwrap(), None);
        assert_eq!(d.header().unwrap().num_vars, 2);
    }

    #[test]
    fn test_encoder() {
        let mut out = vec![];
        {
            let mut enc = Encoder::new(&mut out);
            enc.write_header(Header {
                num_vars: 3,
                num_clauses: 2,
            })
            .unwrap();
            enc.encode(&[1, -3]).unwrap();
            enc.encode(&[]).unwrap();
            enc.finish().unwrap();
        }
        assert_eq!(String::from_utf8(out).unwrap(), "p cnf 3 2\n1 -3 0\n0\n");
    }

    #[test]
    fn test_encoder_errors() {
        let mut out = vec![];
        let mut enc = Encoder::new(&mut out);
        assert!(matches!(enc.encode(&[1]), Err(Error::NoHeader)));
        assert!(matches!(enc.finish(), Err(Error::NoHeader)));

        enc.write_header(Header {
            num_vars: 2,
            num_clauses: 1,
        })
        .unwrap();
        assert!(matches!(enc.encode(&[1, 2, -1]), Err(Error::TooManyLiterals)));
        assert!(matches!(enc.encode(&[0]), Err(Error::InvalidLiteral(0))));
        assert!(matches!(enc.encode(&[3]), Err(Error::InvalidLiteral(3))));
        assert!(matches!(enc.encode(&[2, -2]), Err(Error::DuplicateVar(2))));
        assert!(matches!(enc.finish(), Err(Error::NotEnoughClauses)));
        enc.encode(&[-2]).unwrap();
        assert!(matches!(enc.encode(&[1]), Err(Error::TooManyClauses)));
        enc.finish().unwrap();
    }

    #[test]
    fn test_round_trip() {
        let p = Problem {
            num_vars: 4,
            clauses: vec![vec![1, -2, 4], vec![-3], vec![2, 3, -4, -1]],
        };
        let mut out = vec![];
        encode_problem(&mut out, &p).unwrap();
        assert_eq!(Problem::decode(&out[..]).unwrap(), p);
    }

    #[test]
    fn test_into_io_error() {
        let e: io::Error = Error::MissingHeader.into();
        assert_eq!(e.kind(), io::ErrorKind::InvalidData);
        let e: io::Error = Error::Io(io::Error::new(io::ErrorKind::NotFound, "x")).into();
        assert_eq!(e.kind(), io::ErrorKind::NotFound);
    }
}
