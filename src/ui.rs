use crate::display::DisplayBoard;
use crate::models::{AlertLevel, Entry, EntryKind};

pub fn render_index(date: &str, board: &DisplayBoard, filter: Option<&str>) -> String {
    let filter = filter.unwrap_or("");
    let alert_class = match board.alert {
        AlertLevel::Normal => "light",
        AlertLevel::Danger => "danger",
    };

    INDEX_HTML
        .replace("{{DATE}}", date)
        .replace("{{LIMIT_INPUT}}", &board.limit_input.to_string())
        .replace("{{LIMIT}}", &board.limit.to_string())
        .replace("{{TOTAL}}", &board.total.to_string())
        .replace("{{CONSUMED}}", &board.consumed.to_string())
        .replace("{{BURNED}}", &board.burned.to_string())
        .replace("{{REMAINING}}", &board.remaining.to_string())
        .replace("{{PROGRESS}}", &format!("{:.1}", board.progress_width))
        .replace("{{ALERT}}", alert_class)
        .replace("{{FILTER}}", &escape_html(filter))
        .replace("{{MEAL_ROWS}}", &render_rows(EntryKind::Meal, board.rows(EntryKind::Meal), filter))
        .replace(
            "{{WORKOUT_ROWS}}",
            &render_rows(EntryKind::Workout, board.rows(EntryKind::Workout), filter),
        )
}

fn render_rows(kind: EntryKind, rows: &[Entry], filter: &str) -> String {
    let query = filter.trim().to_lowercase();
    rows.iter()
        .filter(|row| query.is_empty() || row.name.to_lowercase().contains(&query))
        .map(|row| {
            format!(
                r#"<li class="item {kind}" data-id="{id}"><span class="name">{name}</span><span class="cal">{calories}</span><button class="delete" data-kind="{kind}" data-id="{id}" aria-label="Remove">&times;</button></li>"#,
                kind = kind.as_str(),
                id = escape_html(row.id.as_str()),
                name = escape_html(&row.name),
                calories = row.calories,
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Calorie Tracker</title>
  <style>
    :root {
      --bg: #f3f6ef;
      --ink: #23301f;
      --muted: #6b7566;
      --meal: #2f6f4e;
      --workout: #3d5a80;
      --danger: #c0392b;
      --light: #ffffff;
      --card: rgba(255, 255, 255, 0.9);
      --shadow: 0 18px 48px rgba(35, 48, 31, 0.14);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: linear-gradient(160deg, var(--bg), #e3ecd9 70%);
      color: var(--ink);
      font-family: "Trebuchet MS", sans-serif;
      display: grid;
      place-items: start center;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(920px, 100%);
      background: var(--card);
      border-radius: 24px;
      box-shadow: var(--shadow);
      padding: 32px;
      display: grid;
      gap: 24px;
    }

    header h1 {
      margin: 0;
      font-size: clamp(1.8rem, 4vw, 2.4rem);
    }

    header p {
      margin: 4px 0 0;
      color: var(--muted);
    }

    .panel {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(150px, 1fr));
      gap: 14px;
    }

    .stat {
      background: var(--light);
      border-radius: 16px;
      padding: 16px;
      border: 1px solid rgba(35, 48, 31, 0.08);
    }

    .stat.danger {
      background: var(--danger);
      color: white;
    }

    .stat .label {
      display: block;
      font-size: 0.8rem;
      text-transform: uppercase;
      letter-spacing: 0.1em;
      color: inherit;
      opacity: 0.7;
    }

    .stat .value {
      display: block;
      font-size: 1.6rem;
      font-weight: 600;
    }

    .progress {
      height: 18px;
      border-radius: 9px;
      background: #dfe6d8;
      overflow: hidden;
    }

    .progress .bar {
      height: 100%;
      background: var(--meal);
      transition: width 300ms ease;
    }

    .progress .bar.danger {
      background: var(--danger);
    }

    .columns {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(280px, 1fr));
      gap: 20px;
    }

    form {
      display: flex;
      gap: 8px;
      flex-wrap: wrap;
    }

    input {
      flex: 1;
      min-width: 90px;
      padding: 10px 12px;
      border-radius: 10px;
      border: 1px solid #c9d3c2;
      font: inherit;
    }

    button {
      border: none;
      border-radius: 10px;
      padding: 10px 16px;
      font: inherit;
      color: white;
      background: var(--meal);
      cursor: pointer;
    }

    button.workout {
      background: var(--workout);
    }

    button.delete,
    button.reset {
      background: var(--danger);
    }

    button.delete {
      padding: 4px 10px;
    }

    ul {
      list-style: none;
      padding: 0;
      margin: 12px 0 0;
      display: grid;
      gap: 8px;
    }

    .item {
      display: flex;
      align-items: center;
      justify-content: space-between;
      gap: 10px;
      background: var(--light);
      border-radius: 12px;
      padding: 10px 14px;
    }

    .item .cal {
      margin-left: auto;
      font-weight: 600;
      color: white;
      border-radius: 8px;
      padding: 2px 10px;
      background: var(--meal);
    }

    .item.workout .cal {
      background: var(--workout);
    }

    .status {
      min-height: 1.2em;
      color: var(--muted);
    }

    .status.error {
      color: var(--danger);
    }
  </style>
</head>
<body>
  <main class="app">
    <header>
      <h1>Calorie Tracker</h1>
      <p>{{DATE}}</p>
    </header>

    <section class="panel">
      <div class="stat"><span class="label">Daily limit</span><span class="value" id="calories-limit">{{LIMIT}}</span></div>
      <div class="stat"><span class="label">Net total</span><span class="value" id="calories-total">{{TOTAL}}</span></div>
      <div class="stat"><span class="label">Consumed</span><span class="value" id="calories-consumed">{{CONSUMED}}</span></div>
      <div class="stat"><span class="label">Burned</span><span class="value" id="calories-burned">{{BURNED}}</span></div>
      <div class="stat {{ALERT}}" id="remaining-card"><span class="label">Remaining</span><span class="value" id="calories-remaining">{{REMAINING}}</span></div>
    </section>

    <div class="progress"><div class="bar {{ALERT}}" id="calorie-progress" style="width: {{PROGRESS}}%"></div></div>

    <form id="limit-form" method="post" action="/limit">
      <input id="limit" name="limit" type="number" min="0" value="{{LIMIT_INPUT}}" />
      <button type="submit">Set limit</button>
    </form>

    <form method="get" action="/">
      <input id="filter" name="q" type="search" placeholder="Filter by name" value="{{FILTER}}" />
    </form>

    <section class="columns">
      <div>
        <h2>Meals</h2>
        <form id="meal-form" method="post" action="/meal/add">
          <input name="name" placeholder="Meal" required />
          <input name="calories" type="number" min="0" placeholder="Calories" required />
          <button type="submit">Add meal</button>
        </form>
        <ul id="meal-items">
{{MEAL_ROWS}}
        </ul>
      </div>
      <div>
        <h2>Workouts</h2>
        <form id="workout-form" method="post" action="/workout/add">
          <input name="name" placeholder="Workout" required />
          <input name="calories" type="number" min="0" placeholder="Calories" required />
          <button class="workout" type="submit">Add workout</button>
        </form>
        <ul id="workout-items">
{{WORKOUT_ROWS}}
        </ul>
      </div>
    </section>

    <form id="reset-form" method="post" action="/reset">
      <button class="reset" type="submit">Reset day</button>
    </form>
    <div class="status" id="status"></div>
  </main>

  <script>
    const statusEl = document.getElementById('status');

    const setStatus = (message, tone) => {
      statusEl.textContent = message;
      statusEl.className = `status ${tone || ''}`;
    };

    const setText = (id, value) => {
      document.getElementById(id).textContent = value;
    };

    const showSummary = (summary) => {
      setText('calories-limit', summary.limit);
      setText('calories-total', summary.total);
      setText('calories-consumed', summary.consumed);
      setText('calories-burned', summary.burned);
      setText('calories-remaining', summary.remaining);
      const tone = summary.alert === 'danger' ? 'danger' : 'light';
      document.getElementById('remaining-card').className = `stat ${tone}`;
      const bar = document.getElementById('calorie-progress');
      bar.className = `bar ${tone}`;
      bar.style.width = `${summary.progress_percent}%`;
    };

    const rowFor = (kind, entry) => {
      const item = document.createElement('li');
      item.className = `item ${kind}`;
      item.dataset.id = entry.id;
      const name = document.createElement('span');
      name.className = 'name';
      name.textContent = entry.name;
      const cal = document.createElement('span');
      cal.className = 'cal';
      cal.textContent = entry.calories;
      const remove = document.createElement('button');
      remove.className = 'delete';
      remove.dataset.kind = kind;
      remove.dataset.id = entry.id;
      remove.innerHTML = '&times;';
      item.append(name, cal, remove);
      return item;
    };

    const listFor = (kind) => document.getElementById(`${kind}-items`);

    const applyEvents = (events) => {
      events.forEach((event) => {
        switch (event.type) {
          case 'summary_changed':
            showSummary(event.summary);
            break;
          case 'limit_input':
            document.getElementById('limit').value = event.limit;
            break;
          case 'limit_changed':
            setText('calories-limit', event.limit);
            break;
          case 'entry_added':
            listFor(event.kind).appendChild(rowFor(event.kind, event.entry));
            break;
          case 'entry_removed':
            listFor(event.kind).querySelector(`[data-id="${event.id}"]`)?.remove();
            break;
          case 'cleared':
            listFor('meal').replaceChildren();
            listFor('workout').replaceChildren();
            break;
        }
      });
    };

    const send = async (method, url, body) => {
      const res = await fetch(url, {
        method,
        headers: body ? { 'content-type': 'application/json' } : {},
        body: body ? JSON.stringify(body) : undefined
      });
      if (!res.ok) {
        const msg = await res.text();
        throw new Error(msg || 'Request failed');
      }
      const update = await res.json();
      applyEvents(update.events);
      setStatus('Saved', 'ok');
      setTimeout(() => setStatus('', ''), 1200);
    };

    const bindEntryForm = (kind) => {
      const form = document.getElementById(`${kind}-form`);
      form.addEventListener('submit', (event) => {
        event.preventDefault();
        const data = new FormData(form);
        send('POST', `/api/${kind}s`, {
          name: data.get('name'),
          calories: Number(data.get('calories'))
        })
          .then(() => form.reset())
          .catch((err) => setStatus(err.message, 'error'));
      });
    };

    bindEntryForm('meal');
    bindEntryForm('workout');

    document.getElementById('limit-form').addEventListener('submit', (event) => {
      event.preventDefault();
      const limit = Number(document.getElementById('limit').value);
      send('PUT', '/api/limit', { limit }).catch((err) => setStatus(err.message, 'error'));
    });

    document.getElementById('reset-form').addEventListener('submit', (event) => {
      event.preventDefault();
      send('POST', '/api/reset').catch((err) => setStatus(err.message, 'error'));
    });

    document.querySelector('.columns').addEventListener('click', (event) => {
      const button = event.target.closest('button.delete');
      if (!button) {
        return;
      }
      const { kind, id } = button.dataset;
      send('DELETE', `/api/${kind}s/${encodeURIComponent(id)}`).catch((err) =>
        setStatus(err.message, 'error')
      );
    });
  </script>
</body>
</html>
"#;
