// Code generated by schema-bindgen (v0.1.0). DO NOT EDIT.

#[derive(Clone, Debug, PartialEq)]
pub enum Message {
    Draw(Message_Draw),
    Line(Message_Line),
}

impl From<Message_Draw> for Message {
    fn from(value: Message_Draw) -> Self {
        Self::Draw(value)
    }
}

impl From<Message_Line> for Message {
    fn from(value: Message_Line) -> Self {
        Self::Line(value)
    }
}

#[allow(non_camel_case_types)]
#[derive(Clone, Debug, PartialEq)]
pub struct Message_Draw {
    pub figure: geometry::Figure,
}

impl Message_Draw {
    #[must_use]
    pub fn new(figure: geometry::Figure) -> Self {
        Self { figure }
    }
}

#[allow(non_camel_case_types)]
#[derive(Clone, Debug, PartialEq)]
pub struct Message_Line {
    pub text: String,
}

impl Message_Line {
    #[must_use]
    pub fn new(text: String) -> Self {
        Self { text }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Reply {
    Line(Reply_Line),
    Done(Reply_Done),
}

impl From<Reply_Line> for Reply {
    fn from(value: Reply_Line) -> Self {
        Self::Line(value)
    }
}

impl From<Reply_Done> for Reply {
    fn from(value: Reply_Done) -> Self {
        Self::Done(value)
    }
}

#[allow(non_camel_case_types)]
#[derive(Clone, Debug, PartialEq)]
pub struct Reply_Line {
    pub number: u32,
}

impl Reply_Line {
    #[must_use]
    pub fn new(number: u32) -> Self {
        Self { number }
    }
}

#[allow(non_camel_case_types)]
#[derive(Clone, Debug, PartialEq)]
pub struct Reply_Done {}

impl Reply_Done {
    #[must_use]
    pub fn new() -> Self {
        Self {}
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Session {
    /// Message texts already handled.
    pub seen: ::std::collections::HashSet<String>,
}

impl Session {
    #[must_use]
    pub fn new(seen: ::std::collections::HashSet<String>) -> Self {
        Self { seen }
    }
}

/// Planar shapes.
pub mod geometry {
    /// A point on the plane.
    #[derive(Clone, Debug, PartialEq)]
    pub struct Point {
        /// Horizontal offset.
        pub x: f64,
        pub y: f64,
    }

    impl Point {
        #[must_use]
        pub fn new(x: f64, y: f64) -> Self {
            Self { x, y }
        }
    }

    #[derive(Clone, Debug, PartialEq)]
    pub enum Figure {
        Circle(Circle),
        Line(Line),
        Triangle(Triangle),
    }

    impl From<Circle> for Figure {
        fn from(value: Circle) -> Self {
            Self::Circle(value)
        }
    }

    impl From<Line> for Figure {
        fn from(value: Line) -> Self {
            Self::Line(value)
        }
    }

    impl From<Triangle> for Figure {
        fn from(value: Triangle) -> Self {
            Self::Triangle(value)
        }
    }

    #[derive(Clone, Debug, PartialEq)]
    pub struct Circle {
        pub center: Point,
        pub radius: f64,
    }

    impl Circle {
        #[must_use]
        pub fn new(center: Point, radius: f64) -> Self {
            Self { center, radius }
        }
    }

    #[derive(Clone, Debug, PartialEq)]
    pub struct Line {
        pub ends: super::tuples::Tuple2<Point, Point>,
    }

    impl Line {
        #[must_use]
        pub fn new(ends: super::tuples::Tuple2<Point, Point>) -> Self {
            Self { ends }
        }
    }

    /// Corners in clockwise order.
    #[derive(Clone, Debug, PartialEq)]
    pub struct Triangle {
        pub corners: [Point; 3],
    }

    impl Triangle {
        #[must_use]
        pub fn new(corners: [Point; 3]) -> Self {
            Self { corners }
        }
    }

    pub const ORIGIN_ID: u16 = 0;
}

pub mod tuples {
    #[derive(Clone, Debug, PartialEq)]
    pub struct Tuple2<T1, T2> {
        pub f1: T1,
        pub f2: T2,
    }

    impl<T1, T2> Tuple2<T1, T2> {
        #[must_use]
        pub fn new(f1: T1, f2: T2) -> Self {
            Self { f1, f2 }
        }
    }
}
