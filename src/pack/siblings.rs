use super::Circle;
use super::enclose::{Lcg, enclose};

/// Places `c` tangent to both `a` and `b`.
fn place(b: Circle, a: Circle, c: Circle) -> Circle {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let d2 = dx * dx + dy * dy;
    if d2 <= 0.0 {
        return Circle {
            x: a.x + c.r,
            y: a.y,
            r: c.r,
        };
    }

    let a2 = (a.r + c.r).powi(2);
    let b2 = (b.r + c.r).powi(2);
    if a2 > b2 {
        let x = (d2 + b2 - a2) / (2.0 * d2);
        let y = (b2 / d2 - x * x).max(0.0).sqrt();
        Circle {
            x: b.x - x * dx - y * dy,
            y: b.y - x * dy + y * dx,
            r: c.r,
        }
    } else {
        let x = (d2 + a2 - b2) / (2.0 * d2);
        let y = (a2 / d2 - x * x).max(0.0).sqrt();
        Circle {
            x: a.x + x * dx - y * dy,
            y: a.y + x * dy + y * dx,
            r: c.r,
        }
    }
}

fn intersects(a: Circle, b: Circle) -> bool {
    let dr = a.r + b.r - 1e-6;
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    dr > 0.0 && dr * dr > dx * dx + dy * dy
}

/// Front chain stored as a circular doubly linked list over circle indices.
struct FrontChain {
    next: Vec<usize>,
    previous: Vec<usize>,
}

impl FrontChain {
    fn link(&mut self, from: usize, to: usize) {
        self.next[from] = to;
        self.previous[to] = from;
    }

    // Squared distance from the origin to the weighted midpoint of a pair.
    fn score(&self, circles: &[Circle], node: usize) -> f64 {
        let a = circles[node];
        let b = circles[self.next[node]];
        let ab = a.r + b.r;
        if ab <= 0.0 {
            return a.x * a.x + a.y * a.y;
        }
        let dx = (a.x * b.r + b.x * a.r) / ab;
        let dy = (a.y * b.r + b.y * a.r) / ab;
        dx * dx + dy * dy
    }
}

/// Packs `circles` (radii given) tightly around the origin and returns the
/// radius of their enclosing circle. Positions are written in place, with the
/// enclosing circle centered on the origin.
pub(super) fn pack_siblings(circles: &mut [Circle], rng: &mut Lcg) -> f64 {
    let n = circles.len();
    if n == 0 {
        return 0.0;
    }

    circles[0].x = 0.0;
    circles[0].y = 0.0;
    if n == 1 {
        return circles[0].r;
    }

    circles[0].x = -circles[1].r;
    circles[1].x = circles[0].r;
    circles[1].y = 0.0;
    if n == 2 {
        return circles[0].r + circles[1].r;
    }

    circles[2] = place(circles[1], circles[0], circles[2]);

    let mut chain = FrontChain {
        next: vec![0; n],
        previous: vec![0; n],
    };
    let (mut a, mut b) = (0usize, 1usize);
    chain.link(0, 1);
    chain.link(1, 2);
    chain.link(2, 0);

    let mut i = 3;
    'pack: while i < n {
        circles[i] = place(circles[a], circles[b], circles[i]);
        let c = i;

        // Walk outwards along the chain from both ends of the (a, b) pair,
        // preferring the side with less accumulated radius.
        let (mut j, mut k) = (chain.next[b], chain.previous[a]);
        let (mut sj, mut sk) = (circles[b].r, circles[a].r);
        loop {
            if sj <= sk {
                if intersects(circles[j], circles[c]) {
                    b = j;
                    chain.link(a, b);
                    continue 'pack;
                }
                sj += circles[j].r;
                j = chain.next[j];
            } else {
                if intersects(circles[k], circles[c]) {
                    a = k;
                    chain.link(a, b);
                    continue 'pack;
                }
                sk += circles[k].r;
                k = chain.previous[k];
            }
            if j == chain.next[k] {
                break;
            }
        }

        chain.link(a, c);
        chain.link(c, b);
        b = c;

        let mut best = chain.score(circles, a);
        let mut cursor = chain.next[c];
        while cursor != b {
            let candidate = chain.score(circles, cursor);
            if candidate < best {
                a = cursor;
                best = candidate;
            }
            cursor = chain.next[cursor];
        }
        b = chain.next[a];
        i += 1;
    }

    let mut front = vec![circles[b]];
    let mut cursor = chain.next[b];
    while cursor != b {
        front.push(circles[cursor]);
        cursor = chain.next[cursor];
    }

    let Some(outer) = enclose(&front, rng) else {
        return 0.0;
    };
    for circle in circles.iter_mut() {
        circle.x -= outer.x;
        circle.y -= outer.y;
    }
    outer.r
}
