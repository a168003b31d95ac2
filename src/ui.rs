use crate::dates::day_key;
use chrono::NaiveDate;

pub fn render_index(today: NaiveDate, reminders_enabled: bool) -> String {
    let reminders = if reminders_enabled { "on" } else { "off" };
    INDEX_HTML
        .replace("{{DATE}}", &day_key(today))
        .replace("{{REMINDERS}}", reminders)
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Habit Tracker</title>
  <style>
    @import url('https://fonts.googleapis.com/css2?family=Space+Grotesk:wght@400;500;600&family=Fraunces:wght@600&display=swap');

    :root {
      --bg-1: #f8f3e6;
      --bg-2: #f5d3a7;
      --ink: #2b2a28;
      --accent: #ff6b4a;
      --accent-2: #2f4858;
      --card: rgba(255, 255, 255, 0.86);
      --shadow: 0 24px 60px rgba(47, 72, 88, 0.18);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: radial-gradient(circle at top, var(--bg-2), transparent 60%),
        linear-gradient(135deg, var(--bg-1), #ffe9d4 60%, #f9f2e9 100%);
      color: var(--ink);
      font-family: "Space Grotesk", "Trebuchet MS", sans-serif;
      display: grid;
      place-items: center;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(860px, 100%);
      background: var(--card);
      backdrop-filter: blur(12px);
      border-radius: 28px;
      box-shadow: var(--shadow);
      padding: 36px;
      display: grid;
      gap: 28px;
    }

    h1 {
      font-family: "Fraunces", "Georgia", serif;
      font-size: clamp(2rem, 4vw, 2.8rem);
      margin: 0;
    }

    h2 {
      margin: 0 0 12px;
      font-size: 1.3rem;
    }

    .subtitle,
    .hint {
      margin: 0;
      color: #5f5c57;
    }

    .card {
      background: white;
      border-radius: 20px;
      padding: 18px;
      border: 1px solid rgba(47, 72, 88, 0.08);
    }

    .progress {
      height: 12px;
      border-radius: 999px;
      background: rgba(47, 72, 88, 0.1);
      overflow: hidden;
    }

    .progress > div {
      height: 100%;
      background: var(--accent);
      transition: width 300ms ease;
    }

    form.row,
    .row {
      display: flex;
      flex-wrap: wrap;
      gap: 10px;
      align-items: center;
    }

    input[type="text"],
    input[type="time"],
    textarea {
      flex: 1 1 180px;
      border: 1px solid rgba(47, 72, 88, 0.2);
      border-radius: 14px;
      padding: 10px 14px;
      font: inherit;
    }

    button {
      appearance: none;
      border: none;
      border-radius: 999px;
      padding: 10px 18px;
      font: inherit;
      font-weight: 600;
      cursor: pointer;
      background: var(--accent-2);
      color: white;
    }

    button.primary {
      background: var(--accent);
    }

    button.ghost {
      background: transparent;
      color: var(--accent-2);
    }

    .days label {
      font-size: 0.85rem;
      display: inline-flex;
      gap: 4px;
      align-items: center;
    }

    ul.habits {
      list-style: none;
      margin: 0;
      padding: 0;
      display: grid;
      gap: 10px;
    }

    ul.habits li {
      display: flex;
      align-items: center;
      gap: 14px;
    }

    .check {
      width: 44px;
      height: 44px;
      padding: 0;
      background: transparent;
      color: var(--accent-2);
      border: 2px solid var(--accent-2);
    }

    .check.done {
      background: var(--accent);
      border-color: var(--accent);
      color: white;
    }

    .habit-name {
      flex: 1;
    }

    .habit-name.done {
      text-decoration: line-through;
      color: #8b857d;
    }

    .meta {
      font-size: 0.85rem;
      color: #8b857d;
    }

    .chart {
      display: grid;
      grid-template-columns: repeat(7, 1fr);
      gap: 10px;
      align-items: end;
      height: 180px;
    }

    .bar {
      display: grid;
      gap: 6px;
      text-align: center;
      font-size: 0.8rem;
      color: #7a746d;
    }

    .bar > div {
      background: var(--accent);
      border-radius: 8px;
      min-height: 2px;
    }

    .status {
      min-height: 1.2em;
      color: #6b645d;
    }

    .status[data-type="error"] {
      color: #c63b2b;
    }
  </style>
</head>
<body>
  <main class="app" data-reminders="{{REMINDERS}}">
    <header>
      <h1>Habit Tracker</h1>
      <p class="subtitle">Today is <span id="today">{{DATE}}</span>. Reminders are {{REMINDERS}}.</p>
    </header>

    <section class="card">
      <h2>Today's progress</h2>
      <p id="progress-text" class="hint">Loading...</p>
      <div class="progress"><div id="progress-bar" style="width: 0%"></div></div>
      <p id="coach" class="hint"></p>
    </section>

    <section class="card">
      <h2>Add a habit</h2>
      <form id="add-form" class="row">
        <input id="add-name" type="text" placeholder="e.g., Drink water, Read for 15 minutes" />
        <input id="add-time" type="time" />
        <button class="primary" type="submit">Add</button>
      </form>
      <div id="add-days" class="row days"></div>
    </section>

    <section class="card">
      <h2>Need inspiration?</h2>
      <form id="suggest-form" class="row">
        <textarea id="interests" rows="2" placeholder="I want to be more active and improve my focus."></textarea>
        <button type="submit">Get suggestions</button>
      </form>
      <ul id="suggestions" class="habits"></ul>
    </section>

    <section class="card">
      <h2>My habits</h2>
      <ul id="habits" class="habits"></ul>
    </section>

    <section class="card">
      <h2>Weekly completion rate</h2>
      <div id="chart" class="chart"></div>
      <h2>Longest streaks</h2>
      <ul id="streaks" class="habits"></ul>
    </section>

    <div class="status" id="status"></div>
  </main>

  <script>
    const DAYS = ['Sun', 'Mon', 'Tue', 'Wed', 'Thu', 'Fri', 'Sat'];
    const statusEl = document.getElementById('status');

    const setStatus = (text, type) => {
      statusEl.textContent = text;
      statusEl.dataset.type = type || '';
    };

    const api = async (path, options = {}) => {
      const res = await fetch(path, {
        headers: { 'content-type': 'application/json' },
        ...options,
      });
      if (!res.ok) {
        const msg = await res.text();
        throw new Error(msg || 'Request failed');
      }
      return res.json();
    };

    const dayPicker = (container, selected = []) => {
      container.innerHTML = '';
      DAYS.forEach((day) => {
        const label = document.createElement('label');
        const box = document.createElement('input');
        box.type = 'checkbox';
        box.value = day;
        box.checked = selected.includes(day);
        label.append(box, day);
        container.append(label);
      });
    };

    const pickedDays = (container) =>
      [...container.querySelectorAll('input:checked')].map((box) => box.value);

    const renderHabits = (list) => {
      const ul = document.getElementById('habits');
      ul.innerHTML = '';
      if (list.habits.length === 0) {
        ul.innerHTML = '<li class="hint">No habits yet! Start by adding one above.</li>';
      }
      list.habits.forEach((habit) => {
        const li = document.createElement('li');

        const check = document.createElement('button');
        check.className = 'check' + (habit.completed_today ? ' done' : '');
        check.textContent = '✓';
        check.onclick = () => mutate(`/api/habits/${habit.id}/toggle`, { method: 'POST' });

        const name = document.createElement('div');
        name.className = 'habit-name' + (habit.completed_today ? ' done' : '');
        const schedule = habit.days.length ? habit.days.join(' ') : 'Every day';
        name.innerHTML = `<div></div><div class="meta">${habit.current_streak} day streak · best ${habit.longest_streak} · ${schedule}${habit.time ? ' · ' + habit.time : ''}${habit.due_today ? '' : ' · not due today'}</div>`;
        name.firstChild.textContent = habit.name;

        const edit = document.createElement('button');
        edit.className = 'ghost';
        edit.textContent = 'Edit';
        edit.onclick = () => {
          const newName = prompt('Habit name', habit.name);
          if (newName === null) return;
          const time = prompt('Time (HH:MM, blank for none)', habit.time || '');
          if (time === null) return;
          const days = prompt('Days (e.g. Mon Wed Fri, blank for every day)', habit.days.join(' '));
          if (days === null) return;
          mutate(`/api/habits/${habit.id}`, {
            method: 'PUT',
            body: JSON.stringify({
              name: newName,
              time,
              days: days.split(/[\s,]+/).filter((d) => DAYS.includes(d)),
            }),
          });
        };

        const remove = document.createElement('button');
        remove.className = 'ghost';
        remove.textContent = 'Delete';
        remove.onclick = () => mutate(`/api/habits/${habit.id}`, { method: 'DELETE' });

        li.append(check, name, edit, remove);
        ul.append(li);
      });
    };

    const renderToday = (today) => {
      document.getElementById('progress-text').textContent =
        `${today.completed} of ${today.total} habits completed.` +
        (today.all_done ? ' All habits completed! Great job!' : '');
      document.getElementById('progress-bar').style.width = `${today.percentage}%`;
    };

    const renderStats = (stats) => {
      const chart = document.getElementById('chart');
      chart.innerHTML = '';
      stats.weekly.forEach((point) => {
        const bar = document.createElement('div');
        bar.className = 'bar';
        bar.title = `${point.completed} of ${point.total} habits`;
        bar.innerHTML = `<span>${point.percentage}%</span><div style="height:${point.percentage * 1.2}px"></div><span>${point.label}</span>`;
        chart.append(bar);
      });

      const streaks = document.getElementById('streaks');
      streaks.innerHTML = '';
      if (stats.top_streaks.length === 0) {
        streaks.innerHTML = '<li class="hint">Complete some habits to build up a streak!</li>';
      }
      stats.top_streaks.forEach((entry) => {
        const li = document.createElement('li');
        li.textContent = `${entry.name}: ${entry.streak} days`;
        streaks.append(li);
      });
    };

    const refresh = async () => {
      const [list, today, stats] = await Promise.all([
        api('/api/habits'),
        api('/api/today'),
        api('/api/stats'),
      ]);
      renderHabits(list);
      renderToday(today);
      renderStats(stats);
    };

    const loadCoach = async () => {
      const coach = await api('/api/coach');
      document.getElementById('coach').textContent = coach.message;
    };

    const mutate = async (path, options) => {
      try {
        renderHabits(await api(path, options));
        const [today, stats] = await Promise.all([api('/api/today'), api('/api/stats')]);
        renderToday(today);
        renderStats(stats);
        setStatus('', '');
      } catch (err) {
        setStatus(err.message, 'error');
      }
    };

    document.getElementById('add-form').addEventListener('submit', (event) => {
      event.preventDefault();
      const nameEl = document.getElementById('add-name');
      const timeEl = document.getElementById('add-time');
      const daysEl = document.getElementById('add-days');
      if (!nameEl.value.trim()) return;
      mutate('/api/habits', {
        method: 'POST',
        body: JSON.stringify({ name: nameEl.value, time: timeEl.value, days: pickedDays(daysEl) }),
      }).then(() => {
        nameEl.value = '';
        timeEl.value = '';
        dayPicker(daysEl);
      });
    });

    document.getElementById('suggest-form').addEventListener('submit', async (event) => {
      event.preventDefault();
      const interests = document.getElementById('interests').value;
      if (!interests.trim()) return;
      const ul = document.getElementById('suggestions');
      ul.innerHTML = '<li class="hint">Thinking...</li>';
      try {
        const result = await api('/api/suggestions', {
          method: 'POST',
          body: JSON.stringify({ interests }),
        });
        ul.innerHTML = '';
        result.habits.forEach((name) => {
          const li = document.createElement('li');
          const label = document.createElement('span');
          label.className = 'habit-name';
          label.textContent = name;
          const add = document.createElement('button');
          add.className = 'ghost';
          add.textContent = 'Add';
          add.onclick = () => {
            li.remove();
            mutate('/api/habits/batch', { method: 'POST', body: JSON.stringify({ names: [name] }) });
          };
          li.append(label, add);
          ul.append(li);
        });
      } catch (err) {
        ul.innerHTML = '';
        setStatus(err.message, 'error');
      }
    });

    dayPicker(document.getElementById('add-days'));
    refresh().catch((err) => setStatus(err.message, 'error'));
    loadCoach().catch(() => {});
  </script>
</body>
</html>
"#;
