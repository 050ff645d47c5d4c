//! Reader and writer for the textual `spec` format of the MIST toolsuite.
//!
//! ```text
//! vars
//!     p1 p2
//! rules
//!     p1 >= 1 ->
//!         p1' = p1-1,
//!         p2' = p2+1;
//! init
//!     p1=1, p2=0
//! ```
//!
//! A guard `p >= k` becomes the `pre` entry of `p`. An update `p' = p+d` sets
//! the `post` entry to `k + d`. Places with a guard but no update keep their
//! tokens. Only updates of a place onto itself are supported, and a `target`
//! section is accepted but ignored since boundedness has no target.
use hashbrown::HashSet;
use itertools::Itertools;
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::tag,
    character::complete::{alpha1, alphanumeric0, char, digit1, multispace0, multispace1},
    combinator::{map_res, opt, recognize, verify},
    multi::{many0, separated_list1},
    sequence::{pair, preceded},
};

use crate::net::{
    PetriNet,
    ids::{PlaceId, TransitionId},
    initialized::InitializedNet,
    marking::Marking,
    transition::Transition,
};

fn number(input: &str) -> IResult<&str, u32> {
    map_res(digit1, |digits: &str| digits.parse::<u32>()).parse(input)
}

fn identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(alpha1, alphanumeric0)).parse(input)
}

const KEYWORDS: [&str; 4] = ["vars", "rules", "init", "target"];

fn place_name(input: &str) -> IResult<&str, &str> {
    verify(identifier, |name: &str| !KEYWORDS.contains(&name)).parse(input)
}

fn list_separator(input: &str) -> IResult<&str, char> {
    (multispace0, char(','), multispace0)
        .map(|(_, separator, _)| separator)
        .parse(input)
}

fn keyword<'a>(
    word: &'static str,
) -> impl Parser<&'a str, Output = &'a str, Error = nom::error::Error<&'a str>> {
    preceded(multispace0, tag(word))
}

/// `p >= k` or, inside `init`, `p = k`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint<'a> {
    pub place: &'a str,
    pub value: u32,
}

fn constraint<'a>(
    operator: &'static str,
) -> impl Parser<&'a str, Output = Constraint<'a>, Error = nom::error::Error<&'a str>> {
    (identifier, multispace0, tag(operator), multispace0, number)
        .map(|(place, _, _, _, value)| Constraint { place, value })
}

#[test]
fn test_guard_constraint() {
    let (rest, guard) = constraint(">=").parse("abc12 >= 34 ->").unwrap();
    assert_eq!(guard, Constraint { place: "abc12", value: 34 });
    assert_eq!(rest, " ->");
}

/// `p' = p+d` or `p' = p-d`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Update<'a> {
    pub target: &'a str,
    pub source: &'a str,
    pub change: i64,
}

fn update(input: &str) -> IResult<&str, Update<'_>> {
    (
        identifier,
        char('\''),
        multispace0,
        char('='),
        multispace0,
        identifier,
        multispace0,
        alt((char('+'), char('-'))),
        multispace0,
        number,
    )
        .map(|(target, _, _, _, _, source, _, sign, _, value)| Update {
            target,
            source,
            change: if sign == '-' {
                -i64::from(value)
            } else {
                i64::from(value)
            },
        })
        .parse(input)
}

#[test]
fn test_update() {
    let (_, parsed) = update("p3' = a1-5").unwrap();
    assert_eq!(
        parsed,
        Update {
            target: "p3",
            source: "a1",
            change: -5
        }
    );

    let (_, parsed) = update("p2'=p2 + 1").unwrap();
    assert_eq!(parsed.change, 1);
}

#[derive(Debug, Clone)]
pub struct Rule<'a> {
    pub guards: Vec<Constraint<'a>>,
    pub updates: Vec<Update<'a>>,
}

fn rule(input: &str) -> IResult<&str, Rule<'_>> {
    (
        separated_list1(list_separator, constraint(">=")),
        multispace0,
        tag("->"),
        multispace0,
        separated_list1(list_separator, update),
        multispace0,
        char(';'),
    )
        .map(|(guards, _, _, _, updates, _, _)| Rule { guards, updates })
        .parse(input)
}

#[test]
fn test_rule() {
    let input = r#"p1 >= 1, p2 >= 0 ->
        p1' = p1 - 1,
        p2' = p2 + 1;"#;

    let (rest, parsed) = rule(input).unwrap();
    assert_eq!(parsed.guards.len(), 2);
    assert_eq!(parsed.updates.len(), 2);
    assert!(rest.is_empty());
}

/// The parsed text, before places are resolved.
#[derive(Debug, Clone)]
pub struct SpecDocument<'a> {
    pub places: Vec<&'a str>,
    pub rules: Vec<Rule<'a>>,
    pub init: Vec<Constraint<'a>>,
}

fn document(input: &str) -> IResult<&str, SpecDocument<'_>> {
    let (input, _) = (keyword("vars"), multispace1).parse(input)?;
    let (input, places) = separated_list1(multispace1, place_name).parse(input)?;

    let (input, _) = (keyword("rules"), multispace1).parse(input)?;
    let (input, rules) = many0(preceded(multispace0, rule)).parse(input)?;

    let (input, _) = (keyword("init"), multispace1).parse(input)?;
    let (input, init) = separated_list1(list_separator, constraint("=")).parse(input)?;

    let (input, _) = (
        opt((
            keyword("target"),
            multispace1,
            separated_list1(list_separator, constraint("=")),
        )),
        multispace0,
    )
        .parse(input)?;

    Ok((
        input,
        SpecDocument {
            places,
            rules,
            init,
        },
    ))
}

impl<'a> SpecDocument<'a> {
    pub fn parse(input: &'a str) -> anyhow::Result<Self> {
        match document(input) {
            Ok(("", parsed)) => Ok(parsed),
            Ok((rest, _)) => Err(anyhow::anyhow!(
                "Unexpected trailing input in spec: '{}'",
                rest.lines().next().unwrap_or_default()
            )),
            Err(e) => Err(anyhow::anyhow!("Failed to parse spec: {}", e)),
        }
    }

    fn place_index(&self, name: &str) -> anyhow::Result<usize> {
        self.places
            .iter()
            .position(|&place| place == name)
            .ok_or_else(|| anyhow::anyhow!("Variable '{}' not found in variable list.", name))
    }

    fn to_transition(&self, index: usize, rule: &Rule<'a>) -> anyhow::Result<Transition> {
        let mut pre = vec![0; self.places.len()];

        for guard in &rule.guards {
            pre[self.place_index(guard.place)?] = guard.value;
        }

        let mut post = pre.clone();
        for update in &rule.updates {
            if update.source != update.target {
                anyhow::bail!(
                    "Unsupported update from '{}' to '{}'. Only changes to the place itself are supported.",
                    update.source,
                    update.target
                );
            }

            let place = self.place_index(update.target)?;
            let produced = i64::from(pre[place]) + update.change;
            post[place] = u32::try_from(produced).map_err(|_| {
                anyhow::anyhow!(
                    "Rule {} consumes {} tokens from '{}', but its guard only requires {}.",
                    index,
                    -update.change,
                    update.target,
                    pre[place]
                )
            })?;
        }

        Ok(Transition::new(
            TransitionId::new(index).to_string(),
            pre,
            post,
        ))
    }
}

impl TryFrom<SpecDocument<'_>> for InitializedNet {
    type Error = anyhow::Error;

    fn try_from(document: SpecDocument) -> Result<Self, Self::Error> {
        if let Some(duplicate) = document.places.iter().duplicates().next() {
            anyhow::bail!("Variable '{}' is declared twice.", duplicate);
        }

        let mut net =
            PetriNet::with_place_names(document.places.iter().map(|p| p.to_string()).collect());
        for (index, rule) in document.rules.iter().enumerate() {
            net.add_transition(document.to_transition(index, rule)?);
        }

        let mut initial = vec![0; document.places.len()];
        for atom in &document.init {
            initial[document.place_index(atom.place)?] = atom.value;
        }

        Ok(InitializedNet::new(net, Marking::from(initial)))
    }
}

pub fn parse_spec(input: &str) -> anyhow::Result<InitializedNet> {
    InitializedNet::try_from(SpecDocument::parse(input)?)
}

pub trait ToSpecFormat {
    fn to_spec_format(&self) -> String;
}

impl ToSpecFormat for InitializedNet {
    fn to_spec_format(&self) -> String {
        let names = spec_place_names(&self.net);
        let Some(first) = names.first() else {
            return String::new();
        };

        let mut out = String::new();

        out.push_str("vars\n    ");
        out.push_str(&names.join(" "));
        out.push('\n');

        out.push_str("rules\n");
        for transition in self.net.transitions() {
            let mut guards = transition
                .pre()
                .iter()
                .zip(&names)
                .filter(|(pre, _)| **pre > 0)
                .map(|(pre, name)| format!("{} >= {}", name, pre))
                .collect_vec();
            if guards.is_empty() {
                guards.push(format!("{} >= 0", first));
            }

            let mut updates = PlaceId::iter_places(names.len())
                .filter_map(|place| {
                    let change = transition.effect(place);
                    let name = &names[place.index()];
                    match change {
                        0 => None,
                        c if c > 0 => Some(format!("{}' = {}+{}", name, name, c)),
                        c => Some(format!("{}' = {}-{}", name, name, -c)),
                    }
                })
                .collect_vec();
            if updates.is_empty() {
                updates.push(format!("{}' = {}+0", first, first));
            }

            out.push_str("    ");
            out.push_str(&guards.join(", "));
            out.push_str(" ->\n        ");
            out.push_str(&updates.join(",\n        "));
            out.push_str(";\n");
        }

        out.push_str("init\n    ");
        out.push_str(
            &names
                .iter()
                .zip(self.initial_marking.iter())
                .map(|(name, tokens)| format!("{}={}", name, tokens))
                .join(", "),
        );
        out.push('\n');

        out
    }
}

/// Place names if they are all distinct identifiers, `p0`, `p1`, ... otherwise.
fn spec_place_names(net: &PetriNet) -> Vec<String> {
    let valid = |name: &String| place_name(name).is_ok_and(|(rest, _)| rest.is_empty());
    let distinct = net.place_names().iter().collect::<HashSet<_>>().len() == net.place_count();

    if distinct && net.place_names().iter().all(valid) {
        net.place_names().to_vec()
    } else {
        PlaceId::iter_places(net.place_count())
            .map(|place| place.to_string())
            .collect()
    }
}

#[test]
fn test_document() {
    let input = r#"
    vars
        p1 p2 p3
    rules
        p1 >= 1 ->
            p1' = p1-1,
            p2' = p2+1;
        p2 >= 1 ->
            p2' = p2-1,
            p3' = p3+1;
    init
        p1=2, p2=0, p3=0
    target
        p1=0, p2=0, p3=2"#;

    let parsed = SpecDocument::parse(input).unwrap();
    assert_eq!(parsed.places, vec!["p1", "p2", "p3"]);
    assert_eq!(parsed.rules.len(), 2);
    assert_eq!(parsed.init.len(), 3);
}
