// Create the Error, ErrorKind, ResultExt, and Result types.
// Other modules `use crate::errors::*;` to get at everything `error_chain!` creates.
use error_chain::error_chain;

error_chain! {

    foreign_links {
        Io(::std::io::Error);
        Image(::image::ImageError);
        Rand(::rand::Error);
        ParseInt(::std::num::ParseIntError);
    }

    errors {
        InvalidDimensions(reason: String) {
            description("invalid maze dimensions")
            display("invalid maze dimensions: {}", reason)
        }
        DegenerateRoomPlan(attempts: usize) {
            description("room plan never grew beyond the centre room")
            display("room plan never grew beyond the centre room after {} attempts", attempts)
        }
        MalformedDoor(x: u32, y: u32) {
            description("door tile without a void axis pair")
            display("door at ({}, {}) has no pair of void neighbours to hang between", x, y)
        }
        UnknownTile(symbol: char) {
            description("unknown tile symbol")
            display("unknown tile symbol '{}'", symbol)
        }
        NotSolvingExpression {
            description("no expression is being solved")
            display("no expression is being solved")
        }
        EmptyAnswer {
            description("no answer entered")
            display("no answer entered")
        }
        AnswerDoesNotFit(answer: i32) {
            description("answer does not fit the answer entry")
            display("answer {} does not fit the answer entry", answer)
        }
        SessionOver {
            description("the session has already finished")
            display("the session has already finished")
        }
    }
}
